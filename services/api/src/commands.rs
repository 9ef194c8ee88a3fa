use clap::Args;
use lead_ranker::config::{load_scoring_config, AppConfig};
use lead_ranker::error::AppError;
use lead_ranker::telemetry;
use lead_ranker::workflows::export;
use lead_ranker::workflows::ingest::LeadImporter;
use lead_ranker::workflows::scoring::{
    LeadFilter, LeadScoringEngine, ScoredBatch, ScoredLead, ScoringConfig, ScoringError,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Lead CSV export to score
    #[arg(long, short)]
    pub(crate) input: PathBuf,
    /// JSON scoring configuration (defaults to LEAD_SCORING_CONFIG, then built-in weights)
    #[arg(long)]
    pub(crate) scoring_config: Option<PathBuf>,
    /// Write every ranked lead with its score columns to this CSV file
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
    /// Apply the display filters to the `--output` CSV as well
    #[arg(long, requires = "output")]
    pub(crate) filtered_output: bool,
    /// Only show leads whose final score is at least this value (0-100)
    #[arg(long, value_parser = crate::infra::parse_score)]
    pub(crate) min_score: Option<f64>,
    /// Only show leads whose industry contains this text
    #[arg(long)]
    pub(crate) industry: Option<String>,
    /// Only show leads with at least this many employees
    #[arg(long)]
    pub(crate) min_employees: Option<u32>,
    /// Only show leads with at most this many employees
    #[arg(long)]
    pub(crate) max_employees: Option<u32>,
    /// Limit output to the N best leads
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Print the full report as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

impl ScoreArgs {
    fn filter(&self) -> LeadFilter {
        LeadFilter {
            min_score: self.min_score,
            industry: self.industry.clone(),
            min_employees: self.min_employees,
            max_employees: self.max_employees,
            top: self.top,
        }
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let scoring = match &args.scoring_config {
        Some(path) => load_scoring_config(path)?,
        None => config.scoring,
    };
    let scored = score_file(&args, scoring)?;
    let filter = args.filter();
    let selected = filter.apply(&scored.leads);

    if let Some(path) = &args.output {
        let rows = export_rows(&args, &scored, &selected);
        let file = File::create(path)?;
        export::write_csv(BufWriter::new(file), &scored, &rows)?;
        info!(
            path = %path.display(),
            rows = rows.len(),
            filtered = args.filtered_output,
            "wrote scored leads"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scored.report(&filter))?);
    } else {
        render_score_report(&scored, &selected);
    }

    Ok(())
}

/// The export keeps every surviving lead unless `--filtered-output` narrows it to the
/// displayed selection.
fn export_rows<'a>(
    args: &ScoreArgs,
    scored: &'a ScoredBatch,
    selected: &[&'a ScoredLead],
) -> Vec<&'a ScoredLead> {
    if args.filtered_output {
        selected.to_vec()
    } else {
        scored.ranked()
    }
}

fn score_file(args: &ScoreArgs, scoring: ScoringConfig) -> Result<ScoredBatch, AppError> {
    let engine = LeadScoringEngine::new(scoring).map_err(ScoringError::from)?;
    let batch = LeadImporter::from_path(&args.input)?;
    Ok(engine.score_batch(batch)?)
}

pub(crate) fn run_config_defaults() -> Result<(), AppError> {
    println!(
        "{}",
        serde_json::to_string_pretty(&ScoringConfig::default())?
    );
    Ok(())
}

pub(crate) fn render_score_report(scored: &ScoredBatch, selected: &[&ScoredLead]) {
    let summary = &scored.summary;

    println!("Lead scoring report");
    println!(
        "Rows: {} read, {} scored, {} duplicates removed, {} field issues",
        summary.total_rows, summary.scored, summary.duplicates_removed, summary.field_issues
    );
    println!(
        "Tiers: {} high, {} medium, {} low",
        summary.high_priority, summary.medium_priority, summary.low_priority
    );
    if let Some(mean) = summary.mean_score {
        println!("Mean score: {:.1}", mean);
    }
    if let (Some(before), Some(after)) = (&summary.composite_quartiles, &summary.final_quartiles) {
        println!(
            "Spread (IQR): {:.1} composite -> {:.1} final",
            before.iqr(),
            after.iqr()
        );
    }

    if selected.is_empty() {
        println!("\nNo leads matched the filters");
        return;
    }

    println!("\nRanked leads");
    for (rank, lead) in selected.iter().enumerate() {
        println!(
            "{:>3}. {:<32} {:>5.1} {:<6} {}",
            rank + 1,
            lead.lead.company.as_deref().unwrap_or("(unnamed)"),
            lead.final_score,
            lead.tier.label(),
            lead.lead.industry.as_deref().unwrap_or("-"),
        );
        println!("     {}", lead.rationale);
        if !lead.risk_flags.is_empty() {
            let risks: Vec<String> = lead.risk_flags.iter().map(|flag| flag.label()).collect();
            println!("     Risks: {}", risks.join("; "));
        }
    }

    if !summary.industries.is_empty() {
        println!("\nIndustries");
        for entry in &summary.industries {
            println!(
                "- {}: {} lead(s), mean {:.1}",
                entry.industry, entry.count, entry.mean_score
            );
        }
    }
}
