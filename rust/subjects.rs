use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

/// Long course names as the LMS lists them, most specific first.
const BUILTIN: &[(&str, &str)] = &[
    ("Computer Organization and Assembly Language", "COAL"),
    ("Parallel and Distributed Computing", "PDC"),
    ("Design and Analysis of Algorithms", "DAA"),
    ("Data Structures and Algorithms", "DSA"),
    ("Database Management Systems", "DBMS"),
    ("Object Oriented Programming", "OOP"),
    ("Human Computer Interaction", "HCI"),
    ("Programming Fundamentals", "PF"),
    ("Artificial Intelligence", "AI"),
    ("Compiler Construction", "CC"),
    ("Discrete Mathematics", "DM"),
    ("Information Security", "IS"),
    ("Software Engineering", "SE"),
    ("Digital Logic Design", "DLD"),
    ("Theory of Automata", "TOA"),
    ("Operating Systems", "OS"),
    ("Computer Networks", "CN"),
    ("Data Structures", "DS"),
    ("Linear Algebra", "LA"),
];

static BUILTIN_PATTERNS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    BUILTIN
        .iter()
        .map(|(long, short)| (long_form_pattern(long).unwrap(), short.to_string()))
        .collect()
});

fn long_form_pattern(long: &str) -> Result<Regex, regex::Error> {
    let words = long
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)\b{}\b", words))
}

/// Course-name shortener. User entries are tried before the built-in table.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    extra: Vec<(Regex, String)>,
}

impl Abbreviations {
    pub fn with_extra(entries: &[(String, String)]) -> Result<Self, regex::Error> {
        let extra = entries
            .iter()
            .map(|(long, short)| Ok((long_form_pattern(long)?, short.clone())))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { extra })
    }

    /// Replaces the first known long course name inside `subject` with its
    /// short form. Unknown subjects come back unchanged.
    pub fn shorten(&self, subject: &str) -> String {
        let subject = subject.split_whitespace().collect::<Vec<_>>().join(" ");
        for (pattern, short) in self.extra.iter().chain(BUILTIN_PATTERNS.iter()) {
            if pattern.is_match(&subject) {
                return pattern.replace(&subject, NoExpand(short.as_str())).into_owned();
            }
        }
        subject
    }
}

/// Parses `Long Name=SHORT;Other Name=ON`.
pub fn parse_entries(raw: &str) -> Result<Vec<(String, String)>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (long, short) = entry
                .split_once('=')
                .ok_or_else(|| format!("entry {:?} is missing '='", entry))?;
            let (long, short) = (long.trim(), short.trim());
            if long.is_empty() || short.is_empty() {
                return Err(format!("entry {:?} has an empty side", entry));
            }
            Ok((long.to_string(), short.to_string()))
        })
        .collect()
}
