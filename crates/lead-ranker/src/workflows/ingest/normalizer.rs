/// Header form used for alias lookup: lower-case ASCII letters and digits only, so
/// "Number of Employees", "number_of_employees" and "NumberOfEmployees" all agree.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_case() {
        assert_eq!(normalize_header("Number of Employees"), "numberofemployees");
        assert_eq!(normalize_header("number_of_employees"), "numberofemployees");
        assert_eq!(normalize_header("\u{feff}Company"), "company");
    }
}
