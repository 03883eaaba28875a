use phf::phf_map;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;
use unicode_script::{Script, UnicodeScript};

use super::types::{CompositionFinding, FindingClass, LocalComposition};

const DIACRITIC_MAP: phf::Map<char, &'static str> = phf_map! {
    'à' => "a", 'á' => "a", 'â' => "a", 'ä' => "a", 'ã' => "a", 'å' => "a",
    'À' => "A", 'Á' => "A", 'Â' => "A", 'Ä' => "A", 'Ã' => "A", 'Å' => "A",
    'ç' => "c", 'Ç' => "C",
    'è' => "e", 'é' => "e", 'ê' => "e", 'ë' => "e",
    'È' => "E", 'É' => "E", 'Ê' => "E", 'Ë' => "E",
    'ì' => "i", 'í' => "i", 'î' => "i", 'ï' => "i",
    'Ì' => "I", 'Í' => "I", 'Î' => "I", 'Ï' => "I",
    'ñ' => "n", 'Ñ' => "N",
    'ò' => "o", 'ó' => "o", 'ô' => "o", 'ö' => "o", 'õ' => "o",
    'Ò' => "O", 'Ó' => "O", 'Ô' => "O", 'Ö' => "O", 'Õ' => "O",
    'ù' => "u", 'ú' => "u", 'û' => "u", 'ü' => "u",
    'Ù' => "U", 'Ú' => "U", 'Û' => "U", 'Ü' => "U",
    'ÿ' => "y", 'Ÿ' => "Y",
    'œ' => "oe", 'Œ' => "OE",
    'æ' => "ae", 'Æ' => "AE",
    'ß' => "ss",
};

const CONFUSABLE_MAP: phf::Map<char, &'static str> = phf_map! {
    // Cyrillic
    'а' => "a",
    'А' => "A",
    'е' => "e",
    'Е' => "E",
    'о' => "o",
    'О' => "O",
    'р' => "p",
    'Р' => "P",
    'с' => "c",
    'С' => "C",
    'у' => "y",
    'У' => "Y",
    'х' => "x",
    'Х' => "X",
    'і' => "i",
    // Greek (upper case focus)
    'Α' => "A",
    'Β' => "B",
    'Ε' => "E",
    'Η' => "H",
    'Ι' => "I",
    'Κ' => "K",
    'Μ' => "M",
    'Ν' => "N",
    'Ο' => "O",
    'Ρ' => "P",
    'Τ' => "T",
    'Χ' => "X",
    'Υ' => "Y",
    'ο' => "o",
};

/// Counts numeric, alphabetic and non-ASCII characters of the local-part and
/// flags look-alike characters, diacritics and script mixing.
pub(crate) fn analyze_local(local: &str) -> LocalComposition {
    let mut composition = LocalComposition::default();
    let mut primary_script: Option<Script> = None;
    let mut fold = String::with_capacity(local.len());

    for ch in local.chars() {
        if ch.is_numeric() {
            composition.numeric += 1;
        } else if ch.is_alphabetic() {
            composition.alphabetic += 1;
        }
        if !ch.is_ascii() {
            composition.unicode += 1;
        }

        match ascii_hint_for_char(ch) {
            Some(hint) => fold.push_str(&hint),
            None => fold.push(ch),
        }

        if let Some(repl) = CONFUSABLE_MAP.get(&ch) {
            composition.has_confusables = true;
            composition.findings.push(CompositionFinding {
                codepoint: ch,
                class: FindingClass::Confusable,
                note: format!("{}({}) → {}(lat)", ch, script_abbrev(ch), repl),
            });
        } else if let Some(repl) = DIACRITIC_MAP.get(&ch) {
            composition.has_diacritics = true;
            composition.findings.push(CompositionFinding {
                codepoint: ch,
                class: FindingClass::Diacritic,
                note: format!("{ch} → {repl} (diacritic)"),
            });
        } else if is_combining_mark(ch) {
            composition.has_diacritics = true;
            composition.findings.push(CompositionFinding {
                codepoint: ch,
                class: FindingClass::Diacritic,
                note: format!("U+{:04X} combining mark", ch as u32),
            });
        }

        if let Some(script) = major_script(ch) {
            match primary_script {
                None => primary_script = Some(script),
                Some(primary) if script != primary && !composition.has_mixed_scripts => {
                    composition.has_mixed_scripts = true;
                    composition.findings.push(CompositionFinding {
                        codepoint: ch,
                        class: FindingClass::MixedScript,
                        note: format!(
                            "mixed scripts in local ({} after {})",
                            script_abbrev(ch),
                            script_name(primary)
                        ),
                    });
                }
                Some(_) => {}
            }
        }
    }

    if composition.unicode > 0 && fold != local && fold.is_ascii() {
        composition.ascii_fold = Some(fold);
    }

    composition
}

/// Syntax warnings derived from the composition. They never invalidate the
/// address.
pub(crate) fn warnings_for(composition: &LocalComposition) -> Vec<String> {
    let mut warnings = Vec::new();
    if composition.has_confusables {
        warnings.push("local part contains confusable characters".to_string());
    }
    if composition.has_mixed_scripts {
        warnings.push("local part mixes scripts".to_string());
    }
    if composition.unicode > 0 {
        warnings.push("local part requires SMTPUTF8".to_string());
    }
    warnings
}

fn ascii_hint_for_char(ch: char) -> Option<String> {
    if is_combining_mark(ch) {
        return Some(String::new());
    }
    if let Some(repl) = CONFUSABLE_MAP.get(&ch) {
        return Some((*repl).to_string());
    }
    if let Some(repl) = DIACRITIC_MAP.get(&ch) {
        return Some((*repl).to_string());
    }
    if ch.is_ascii() {
        return None;
    }

    let decomposed: String = ch
        .to_string()
        .nfkd()
        .filter(|d| !is_combining_mark(*d) && d.is_ascii())
        .collect();
    if decomposed.is_empty() {
        None
    } else {
        Some(decomposed)
    }
}

fn major_script(ch: char) -> Option<Script> {
    match ch.script() {
        Script::Common | Script::Inherited | Script::Unknown => None,
        script => Some(script),
    }
}

fn script_abbrev(ch: char) -> &'static str {
    script_name(ch.script())
}

fn script_name(script: Script) -> &'static str {
    match script {
        Script::Cyrillic => "cyr",
        Script::Greek => "gre",
        Script::Latin => "lat",
        Script::Han => "han",
        Script::Arabic => "ara",
        Script::Hebrew => "heb",
        Script::Hiragana => "hira",
        Script::Katakana => "kata",
        Script::Hangul => "hang",
        _ => "unk",
    }
}
