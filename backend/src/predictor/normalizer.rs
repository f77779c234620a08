use shared::{CanonicalCategory, CanonicalCourse};
use std::cmp::Reverse;

const COURSE_SYNONYMS: &[(&str, CanonicalCourse)] = &[
    ("computer science and engineering", CanonicalCourse::Cse),
    ("computer science", CanonicalCourse::Cse),
    ("computer", CanonicalCourse::Cse),
    ("cse", CanonicalCourse::Cse),
    ("cs", CanonicalCourse::Cse),
    ("information technology", CanonicalCourse::It),
    ("information", CanonicalCourse::It),
    ("it", CanonicalCourse::It),
    ("electronics and communication", CanonicalCourse::Ece),
    ("electronics", CanonicalCourse::Ece),
    ("ece", CanonicalCourse::Ece),
    ("electrical and electronics", CanonicalCourse::Eee),
    ("electrical", CanonicalCourse::Eee),
    ("eee", CanonicalCourse::Eee),
    ("mechanical", CanonicalCourse::Mech),
    ("mech", CanonicalCourse::Mech),
    ("civil", CanonicalCourse::Civil),
];

const CATEGORY_SYNONYMS: &[(&str, CanonicalCategory)] = &[
    ("general", CanonicalCategory::Oc),
    ("open category", CanonicalCategory::Oc),
    ("open", CanonicalCategory::Oc),
    ("unreserved", CanonicalCategory::Oc),
    ("gen", CanonicalCategory::Oc),
    ("ur", CanonicalCategory::Oc),
    ("oc", CanonicalCategory::Oc),
    ("most backward class", CanonicalCategory::Mbc),
    ("mbc", CanonicalCategory::Mbc),
    ("other backward class", CanonicalCategory::Bc),
    ("backward class", CanonicalCategory::Bc),
    ("obc", CanonicalCategory::Bc),
    ("bc", CanonicalCategory::Bc),
    ("scheduled caste", CanonicalCategory::Sc),
    ("sc", CanonicalCategory::Sc),
    ("scheduled tribe", CanonicalCategory::St),
    ("st", CanonicalCategory::St),
];

/// Maps free-text course and category names to canonical codes.
///
/// Never fails: anything unrecognised becomes `CSE` / `OC`.
pub fn normalize(course: &str, category: &str) -> (CanonicalCourse, CanonicalCategory) {
    (normalize_course(course), normalize_category(category))
}

pub fn normalize_course(course: &str) -> CanonicalCourse {
    lookup(COURSE_SYNONYMS, course).unwrap_or_default()
}

pub fn normalize_category(category: &str) -> CanonicalCategory {
    lookup(CATEGORY_SYNONYMS, category).unwrap_or_default()
}

fn lookup<T: Copy>(table: &[(&str, T)], input: &str) -> Option<T> {
    let words = to_words(input);
    if words.is_empty() {
        return None;
    }

    let exact = table
        .iter()
        .find(|(synonym, _)| *synonym == words)
        .map(|(_, code)| *code);
    if exact.is_some() {
        return exact;
    }

    // Most words wins ("electrical and electronics" over "electronics"),
    // then the phrase appearing first in the input.
    let padded = format!(" {} ", words);
    table
        .iter()
        .filter_map(|(synonym, code)| {
            let position = padded.find(&format!(" {} ", synonym))?;
            Some((synonym.split(' ').count(), Reverse(position), *code))
        })
        .max_by_key(|(word_count, position, _)| (*word_count, *position))
        .map(|(_, _, code)| code)
}

/// Lower-cased words joined by single spaces, punctuation dropped.
fn to_words(input: &str) -> String {
    input
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
