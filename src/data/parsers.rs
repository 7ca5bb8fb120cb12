// ============================================================
// Layer 4 — Field Parsers
// ============================================================
// Pure functions turning free-form résumé cells into numbers.
//
// None of these functions can fail. Résumé exports are noisy
// ("з/п не указана", "Женщина , 3O лет", empty cells), so a
// cell that cannot be read yields a documented sentinel and
// the batch keeps going:
//
//   parse_salary            → 0     when the cell has no digits
//   parse_age               → -1    when no "<n> лет/год" is found
//   parse_gender            → 0     unless the text says "муж…"
//   parse_city              → the cell itself, trimmed, when
//                             there is no comma
//   parse_experience_years  → -1.0  when no "Опыт работы …" is found
//
// Text matching works on chars and &str slices, so Cyrillic
// input is never split inside a UTF-8 sequence.
//
// Reference: Rust Book §8 (Strings in Rust)

/// Words that mark a number as a count of years.
/// "год" also covers "года" and "году".
const YEAR_TOKENS: &[&str] = &["лет", "год"];

/// The experience header always says "N лет"; "N года" there
/// is not recognised and falls through to the sentinel.
const EXPERIENCE_YEAR_TOKENS: &[&str] = &["лет"];

/// Covers "месяц", "месяца", "месяцев".
const MONTH_TOKENS: &[&str] = &["месяц"];

const EXPERIENCE_MARKER: &str = "Опыт работы";

/// Only the head of the experience cell is inspected; the full
/// cell holds the whole work history.
const EXPERIENCE_SCAN_CHARS: usize = 200;

// ─── Column names ─────────────────────────────────────────────────────────────

/// Canonical column name: trimmed (BOM included), lowercased,
/// spaces → `_`, commas removed.
///
/// "Пол, возраст" → "пол_возраст"
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_lowercase()
        .replace(' ', "_")
        .replace(',', "")
}

// ─── Gender / age ─────────────────────────────────────────────────────────────

/// 1 if the text denotes a man, otherwise 0.
pub fn parse_gender(text: &str) -> i64 {
    if text.to_lowercase().contains("муж") { 1 } else { 0 }
}

/// First run of digits followed by a year word, e.g.
/// "Мужчина, 29 лет, родился 1 мая 1994" → 29. Returns -1 when
/// there is no such run.
pub fn parse_age(text: &str) -> i64 {
    let lower = text.to_lowercase();

    for (start, c) in lower.char_indices() {
        if !c.is_ascii_digit() {
            continue;
        }
        // Only consider the start of a digit run
        let prev_is_digit = lower[..start].chars().next_back().is_some_and(|p| p.is_ascii_digit());
        if prev_is_digit {
            continue;
        }

        // A run too long for u32 (a phone number, say) is not an age
        let (number, after) = match leading_number(&lower[start..]) {
            Some(parsed) => parsed,
            None         => continue,
        };
        let after = after.trim_start();
        if starts_with_any(after, YEAR_TOKENS) {
            return number as i64;
        }
    }

    -1
}

// ─── Salary ───────────────────────────────────────────────────────────────────

/// All digits of the cell concatenated in order.
///
/// "30 000 руб." → 30000, "от 50.000 до 70.000" → 5000070000,
/// "не указана" → 0. A digit string too long for i64 also gives 0.
pub fn parse_salary(text: &str) -> i64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<i64>().unwrap_or(0)
}

// ─── City ─────────────────────────────────────────────────────────────────────

/// Part of the cell before the first comma, trimmed.
///
/// "Москва , не готов к переезду" → "Москва"
pub fn parse_city(text: &str) -> String {
    text.split(',').next().unwrap_or_default().trim().to_string()
}

// ─── Experience ───────────────────────────────────────────────────────────────

/// Total work experience in years from the head of the
/// "Опыт" cell. Patterns are tried in order of precision:
///
///   "Опыт работы 6 лет 1 месяц" → 6 + 1/12
///   "Опыт работы 6 лет"         → 6.0
///   "Опыт работы 8 месяцев"     → 8/12
///
/// Returns -1.0 if none of them appears.
pub fn parse_experience_years(text: &str) -> f64 {
    let head: String = text.chars().take(EXPERIENCE_SCAN_CHARS).collect();

    let matchers: [fn(&str) -> Option<f64>; 3] = [
        years_and_months,
        years_only,
        months_only,
    ];

    for matcher in matchers {
        let found = head
            .match_indices(EXPERIENCE_MARKER)
            .find_map(|(idx, _)| matcher(&head[idx + EXPERIENCE_MARKER.len()..]));
        if let Some(years) = found {
            return years;
        }
    }

    -1.0
}

fn years_and_months(rest: &str) -> Option<f64> {
    let (years, rest)  = spaced_number(rest)?;
    let rest           = spaced_token(rest, EXPERIENCE_YEAR_TOKENS)?;
    let (months, rest) = spaced_number(rest)?;
    spaced_token(rest, MONTH_TOKENS)?;
    Some(years as f64 + months as f64 / 12.0)
}

fn years_only(rest: &str) -> Option<f64> {
    let (years, rest) = spaced_number(rest)?;
    spaced_token(rest, EXPERIENCE_YEAR_TOKENS)?;
    Some(years as f64)
}

fn months_only(rest: &str) -> Option<f64> {
    let (months, rest) = spaced_number(rest)?;
    spaced_token(rest, MONTH_TOKENS)?;
    Some(months as f64 / 12.0)
}

// ─── Scanning helpers ─────────────────────────────────────────────────────────

/// Parse the ASCII digits at the start of `s`.
/// Returns the number and the remainder after it.
fn leading_number(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let number = s[..end].parse().ok()?;
    Some((number, &s[end..]))
}

/// At least one whitespace char, then a number.
fn spaced_number(s: &str) -> Option<(u32, &str)> {
    leading_number(skip_required_space(s)?)
}

/// At least one whitespace char, then a word starting with one
/// of `tokens`. Returns the remainder after the whole word, so
/// "года 6" leaves " 6".
fn spaced_token<'a>(s: &'a str, tokens: &[&str]) -> Option<&'a str> {
    let s = skip_required_space(s)?;
    tokens
        .iter()
        .find(|t| s.starts_with(*t))
        .map(|t| s[t.len()..].trim_start_matches(char::is_alphabetic))
}

fn skip_required_space(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    if trimmed.len() == s.len() { None } else { Some(trimmed) }
}

fn starts_with_any(s: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| s.starts_with(p))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  Пол, возраст "), "пол_возраст");
        assert_eq!(normalize_column_name("ЗП"), "зп");
        assert_eq!(normalize_column_name("\u{feff}Unnamed: 0"), "unnamed:_0");
        assert_eq!(
            normalize_column_name("Ищет работу на должность:"),
            "ищет_работу_на_должность:"
        );
    }

    #[test]
    fn test_gender_and_age_from_typical_cell() {
        let cell = "Мужчина, 29 лет, родился 16 января 1995";
        assert_eq!(parse_gender(cell), 1);
        assert_eq!(parse_age(cell), 29);
    }

    #[test]
    fn test_age_year_forms() {
        assert_eq!(parse_age("Женщина , 41 год"), 41);
        assert_eq!(parse_age("Женщина , 22 года , родилась 2 мая"), 22);
        assert_eq!(parse_age("Мужчина,35лет"), 35);
        assert_eq!(parse_gender("Женщина , 22 года"), 0);
    }

    #[test]
    fn test_age_sentinel_without_pattern() {
        assert_eq!(parse_age("Мужчина"), -1);
        assert_eq!(parse_age(""), -1);
        assert_eq!(parse_age("родился 16 января 1995"), -1);
    }

    #[test]
    fn test_age_skips_numbers_without_year_word() {
        // "3" is a date, "30" is the age
        assert_eq!(parse_age("Мужчина, родился 3 мая, 30 лет"), 30);
    }

    #[test]
    fn test_salary_concatenates_digits() {
        assert_eq!(parse_salary("30 000 руб."), 30000);
        assert_eq!(parse_salary("120000 руб."), 120000);
        assert_eq!(parse_salary("1\u{a0}500 USD"), 1500);
    }

    #[test]
    fn test_salary_sentinel() {
        assert_eq!(parse_salary("не указана"), 0);
        assert_eq!(parse_salary(""), 0);
        assert_eq!(parse_salary("99999999999999999999999"), 0);
    }

    #[test]
    fn test_city() {
        assert_eq!(parse_city("Москва, Россия"), "Москва");
        assert_eq!(parse_city("  Казань  "), "Казань");
        assert_eq!(parse_city(""), "");
        assert_eq!(parse_city("Тула , готов к переезду , не готов к командировкам"), "Тула");
    }

    #[test]
    fn test_experience_years_and_months() {
        let years = parse_experience_years("Опыт работы 6 лет 1 месяц  Январь 2017 — ...");
        assert!((years - (6.0 + 1.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_experience_years_only_and_months_only() {
        assert_eq!(parse_experience_years("Опыт работы 10 лет  Август 2008"), 10.0);
        assert!((parse_experience_years("Опыт работы 6 месяцев") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_experience_sentinel_and_scan_window() {
        assert_eq!(parse_experience_years("Не указано"), -1.0);
        let far = format!("{}Опыт работы 3 лет", "x".repeat(250));
        assert_eq!(parse_experience_years(&far), -1.0);
    }

    #[test]
    fn test_experience_years_need_let() {
        assert_eq!(parse_experience_years("Опыт работы 2 года 6 месяцев"), -1.0);
        assert_eq!(parse_experience_years("Опыт работы 1 год"), -1.0);
        assert_eq!(parse_experience_years("Опыт работы 2 лет 6 месяцев"), 2.5);
    }
}
