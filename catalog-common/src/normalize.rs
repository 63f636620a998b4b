//! Normalizers for catalogue data
//!
//! Classification codes, author names and "City, Publisher, Year" imprint
//! strings arrive from the catalogue export in many spellings. These pure
//! functions bring them to the form stored in the dictionaries.

/// Subfield separator used by the catalogue export
const SUBFIELD_SEP: char = '\x1f';

/// Pad a GRNTI code to three dot-separated groups
///
/// ```
/// use catalog_common::normalize::normalize_grnti;
///
/// assert_eq!(normalize_grnti("20"), "20.00.00");
/// assert_eq!(normalize_grnti(" 20.15 "), "20.15.00");
/// assert_eq!(normalize_grnti("20.15.05"), "20.15.05");
/// ```
pub fn normalize_grnti(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        return String::new();
    }

    match code.matches('.').count() {
        0 => format!("{}.00.00", code),
        1 => format!("{}.00", code),
        _ => code.to_string(),
    }
}

/// BBK codes compare case-insensitively
pub fn normalize_bbk(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Split a comma-joined code list, dropping blanks
pub fn split_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim, drop blanks and collapse duplicates, keeping first occurrences
pub fn dedup_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        let code = code.as_ref().trim();
        if !code.is_empty() && !out.iter().any(|c| c == code) {
            out.push(code.to_string());
        }
    }
    out
}

/// Search term as typed into a lookup box: trimmed and lower-cased
///
/// Returns `None` for a blank term, which searches answer with no rows.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    let term = raw?.trim();
    if term.is_empty() {
        None
    } else {
        Some(term.to_lowercase())
    }
}

/// Case-insensitive substring test against a term from [`search_term`]
///
/// SQLite only folds ASCII case, so Cyrillic text is compared here.
pub fn matches_term(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(term)
}

fn is_initial(c: char) -> bool {
    c.is_ascii_alphabetic() || ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё'
}

/// Bring "Surname I.O." to its canonical spelling
///
/// ```
/// use catalog_common::normalize::normalize_author;
///
/// assert_eq!(normalize_author("Евтеев  Ю.И."), "Евтеев Ю.И.");
/// assert_eq!(normalize_author("Чернышев А .А"), "Чернышев А.А.");
/// assert_eq!(normalize_author("Пукина А. С."), "Пукина А.С.");
/// ```
pub fn normalize_author(full: &str) -> String {
    let full = full.split_whitespace().collect::<Vec<_>>().join(" ");
    if full.is_empty() {
        return String::new();
    }

    let Some((last_name, rest)) = full.split_once(' ') else {
        return full;
    };

    let rest: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
    let chars: Vec<char> = rest.chars().collect();
    let mut initials = String::new();

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        i += 1;
        if ch == '.' {
            continue;
        }
        if !is_initial(ch) {
            return format!("{} {}", last_name, rest);
        }
        initials.extend(ch.to_uppercase());
        // adjacent letters share one dot
        if i < chars.len() && is_initial(chars[i]) {
            continue;
        }
        initials.push('.');
    }

    if !initials.is_empty() && !initials.ends_with('.') {
        initials.push('.');
    }
    format!("{} {}", last_name, initials)
}

/// Split "Иванов И.И.; Петров П.П." into normalized, unique names
pub fn split_authors(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in raw.split(';') {
        let name = normalize_author(token);
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Extract "Surname I.O." from an author field with `A`/`B` subfields
///
/// Subfields are separated by `\x1f`; some exports use `^` instead.
pub fn parse_author_field(field_text: &str) -> String {
    let text = field_text.replace('^', &SUBFIELD_SEP.to_string());
    let mut last_name = "";
    let mut initials = "";

    for chunk in text.split(SUBFIELD_SEP) {
        let chunk = chunk.trim();
        let mut chars = chunk.chars();
        match chars.next() {
            Some('A') => last_name = chars.as_str().trim(),
            Some('B') => initials = chars.as_str().trim(),
            _ => {}
        }
    }

    let mut initials = initials.to_string();
    if !initials.is_empty() && !initials.ends_with('.') {
        initials.push('.');
    }
    format!("{} {}", last_name, initials).trim().to_string()
}

/// Parsed imprint: publisher, city and year
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubInfo {
    pub publisher: Option<String>,
    pub city: Option<String>,
    pub year: Option<i32>,
}

const CITY_ABBR: &[(&str, &str)] = &[
    ("М", "Москва"),
    ("М.", "Москва"),
    ("СПб", "Санкт-Петербург"),
    ("М. СПб", "Санкт-Петербург"),
    ("Л", "Ленинград"),
    ("Л.", "Ленинград"),
    ("Екб", "Екатеринбург"),
    ("Екат", "Екатеринбург"),
    ("НН", "Нижний Новгород"),
    ("Новосиб", "Новосибирск"),
    ("Каз", "Казань"),
    ("Кр", "Краснодар"),
    ("РнД", "Ростов-на-Дону"),
    ("Сам", "Самара"),
    ("Вл", "Владивосток"),
    ("Влд", "Волгоград"),
    ("Кл", "Калининград"),
    ("Крс", "Красноярск"),
];

const PUBLISHER_HINTS: &[&str] = &[
    "изд", "press", "publisher", "ao ", "ооо ", "zao ", "акц", "gmbh", "ltd", "srl", "llc",
];

const CITY_SUFFIXES: &[&str] = &[
    "ск", "ск-на-Дону", "бург", "град", "город", "инск", "поль", "од",
];

fn expand_city(token: &str) -> String {
    CITY_ABBR
        .iter()
        .find(|(abbr, _)| *abbr == token)
        .map(|(_, city)| city.to_string())
        .unwrap_or_else(|| token.to_string())
}

fn cleanup(token: &str) -> String {
    token
        .trim()
        .trim_matches(|c: char| matches!(c, '«' | '»' | '“' | '”' | '"'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_capital(c: char) -> bool {
    c.is_ascii_uppercase() || ('А'..='Я').contains(&c) || c == 'Ё'
}

fn looks_like_city(token: &str) -> bool {
    if CITY_ABBR.iter().any(|(abbr, _)| *abbr == token) {
        return true;
    }

    // single capitalized word
    let mut chars = token.chars();
    if let Some(first) = chars.next() {
        let rest = chars.as_str();
        if is_capital(first)
            && !rest.is_empty()
            && rest.chars().all(|c| is_initial(c) || c == '-')
        {
            return true;
        }
    }

    CITY_SUFFIXES.iter().any(|suffix| token.ends_with(suffix))
}

fn looks_like_publisher(token: &str) -> bool {
    let low = token.to_lowercase();
    PUBLISHER_HINTS.iter().any(|hint| low.contains(hint))
}

/// Split a trailing four-digit year off the imprint
fn take_year(txt: &str) -> (Option<i32>, &str) {
    let tail: Vec<(usize, char)> = txt.char_indices().rev().take(4).collect();
    if tail.len() == 4 && tail.iter().all(|(_, c)| c.is_ascii_digit()) {
        let start = tail[3].0;
        let year = txt[start..].parse().ok();
        let rest = txt[..start].trim_end_matches([' ', ',', ';']);
        return (year, rest);
    }
    (None, txt)
}

/// Parse an imprint string such as "Юнити- Дана, М, 1999"
///
/// ```
/// use catalog_common::normalize::{parse_pub_info, PubInfo};
///
/// assert_eq!(
///     parse_pub_info("Юнити- Дана, М, 1999"),
///     PubInfo {
///         publisher: Some("Юнити- Дана".to_string()),
///         city: Some("Москва".to_string()),
///         year: Some(1999),
///     }
/// );
/// ```
pub fn parse_pub_info(raw: &str) -> PubInfo {
    let txt = raw.trim();
    if txt.is_empty() {
        return PubInfo::default();
    }

    let (year, txt) = take_year(txt);

    let tokens: Vec<String> = txt
        .split([',', ';'])
        .filter(|t| !t.trim().is_empty())
        .map(cleanup)
        .collect();

    let mut publisher: Option<String> = None;
    let mut city: Option<String> = None;

    for token in tokens {
        if city.is_none() && looks_like_city(&token) {
            city = Some(expand_city(&token));
            continue;
        }
        if publisher.is_none() && looks_like_publisher(&token) {
            publisher = Some(token);
            continue;
        }
        if publisher.is_none() {
            publisher = Some(token);
        } else if city.is_none() {
            city = Some(expand_city(&token));
        }
    }

    PubInfo {
        publisher: publisher.filter(|p| !p.is_empty()),
        city: city.filter(|c| !c.is_empty()),
        year,
    }
}
