//! Contact email normalisation and CSV import/export.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::CoreError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Cells made only of digits and number punctuation (phone numbers, spreadsheet
/// exponents) are never taken as a name.
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d,\.E\+]+$").expect("valid regex"));

/// Header row written by [`export_csv`].
pub const EXPORT_HEADER: &str = "Email,Nome,Data de Cadastro";

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose syntactic check: something@something.tld with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Normalise and validate an address in one step.
pub fn parse_email(email: &str) -> Result<String, CoreError> {
    let normalized = normalize_email(email);
    if !is_valid_email(&normalized) {
        return Err(CoreError::Validation(format!("Invalid email address '{email}'")));
    }
    Ok(normalized)
}

/// A contact row recovered from an uploaded CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedContact {
    pub email: String,
    pub name: Option<String>,
}

/// Parse an uploaded contact list.
///
/// - blank lines are skipped;
/// - the first line is a header if it mentions `email` (any case);
/// - the delimiter is `;` when the first data line contains one, else `,`;
/// - quotes are stripped and cells trimmed;
/// - the email may sit in any column; the name is the last other cell that is
///   longer than one character and not numeric.
///
/// Rows without an email are dropped and repeated addresses are kept once
/// (first occurrence wins). Returns a validation error if nothing usable
/// remains.
pub fn parse_contacts_csv(text: &str) -> Result<Vec<ImportedContact>, CoreError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .collect();

    let Some(first) = lines.first() else {
        return Err(CoreError::Validation("The file contains no valid emails".into()));
    };

    let start = usize::from(first.to_lowercase().contains("email"));
    let delimiter = if lines.get(start).unwrap_or(first).contains(';') {
        ';'
    } else {
        ','
    };

    let mut seen = HashSet::new();
    let mut contacts = Vec::new();

    for line in &lines[start..] {
        let mut email = None;
        let mut name = None;

        for cell in line.split(delimiter) {
            let cell = cell.trim().replace('"', "");
            if is_valid_email(&cell) {
                email = Some(cell);
            } else if cell.chars().count() > 1 && !NUMERIC_RE.is_match(&cell) {
                name = Some(cell);
            }
        }

        if let Some(email) = email {
            let email = email.to_lowercase();
            if seen.insert(email.clone()) {
                contacts.push(ImportedContact { email, name });
            }
        }
    }

    if contacts.is_empty() {
        return Err(CoreError::Validation("The file contains no valid emails".into()));
    }
    Ok(contacts)
}

/// Quote a cell holding a comma, quote or line break; inner quotes are doubled.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render contacts as the admin export file: `Email,Nome,Data de Cadastro`
/// with dates as `dd/mm/yyyy`.
pub fn export_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>, NaiveDate)>,
{
    let mut out = String::from(EXPORT_HEADER);
    for (email, name, created) in rows {
        out.push('\n');
        out.push_str(&csv_escape(email));
        out.push(',');
        out.push_str(&csv_escape(name.unwrap_or("")));
        out.push(',');
        out.push_str(&created.format("%d/%m/%Y").to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[test]
    fn parse_email_rejects_garbage() {
        assert_matches!(parse_email("not-an-email"), Err(CoreError::Validation(_)));
        assert_eq!(parse_email("QA@x.com").unwrap(), "qa@x.com");
    }

    #[test]
    fn header_is_skipped_and_comma_detected() {
        let csv = "email,nome\nana@x.com,Ana Souza\nbia@x.com,Bia\n";
        let contacts = parse_contacts_csv(csv).unwrap();
        assert_eq!(
            contacts,
            vec![
                ImportedContact { email: "ana@x.com".into(), name: Some("Ana Souza".into()) },
                ImportedContact { email: "bia@x.com".into(), name: Some("Bia".into()) },
            ]
        );
    }

    #[test]
    fn semicolon_delimiter_and_any_column() {
        let csv = "\"Carla\";\"11999990000\";\"CARLA@X.COM\"\r\n";
        let contacts = parse_contacts_csv(csv).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email, "carla@x.com");
        assert_eq!(contacts[0].name.as_deref(), Some("Carla"));
    }

    #[test]
    fn numeric_and_single_char_cells_are_not_names() {
        let contacts = parse_contacts_csv("dani@x.com,5.5119E+12,X").unwrap();
        assert_eq!(contacts[0].name, None);
    }

    #[test]
    fn rows_without_email_are_dropped_and_duplicates_collapsed() {
        let csv = "ana@x.com,Ana\nsem email,Fulana\nANA@x.com,Outra\n\n";
        let contacts = parse_contacts_csv(csv).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name.as_deref(), Some("Ana"));
    }

    #[test]
    fn empty_file_is_a_validation_error() {
        assert_matches!(parse_contacts_csv("\n\n"), Err(CoreError::Validation(_)));
        assert_matches!(parse_contacts_csv("email\nnada aqui"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn export_formats_dates_brazilian_style() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let csv = export_csv([("ana@x.com", Some("Ana"), date), ("b@x.com", None, date)]);
        assert_eq!(
            csv,
            "Email,Nome,Data de Cadastro\nana@x.com,Ana,08/03/2026\nb@x.com,,08/03/2026"
        );
    }

    #[test]
    fn export_quotes_names_with_commas_and_quotes() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let csv = export_csv([
            ("ana@x.com", Some("Souza, Ana"), date),
            ("bia@x.com", Some("Bia \"Bi\" Lima"), date),
        ]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "ana@x.com,\"Souza, Ana\",08/03/2026");
        assert_eq!(lines[2], "bia@x.com,\"Bia \"\"Bi\"\" Lima\",08/03/2026");
    }
}
