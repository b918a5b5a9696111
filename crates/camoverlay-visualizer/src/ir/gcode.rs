//! G-code lowering

use regex::Regex;
use std::sync::OnceLock;

use camoverlay_core::Units;

use super::{parse_number, IrArgs, IrNode, IrState, Op};

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| {
        Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("invalid regex pattern")
    })
}

fn comment_regex() -> &'static Regex {
    static COMMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"))
}

/// Remove `;` and `(` comments; lines starting with `'` are comments entirely
fn strip_comment(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.starts_with('\'') {
        return String::new();
    }
    comment_regex().replace(trimmed, "").trim().to_string()
}

/// One address word, e.g. `X12.5`
struct Word<'a> {
    letter: char,
    raw: &'a str,
}

impl Word<'_> {
    fn value(&self) -> Option<f64> {
        parse_number(self.raw)
    }

    fn is_code(&self, letter: char, code: f64) -> bool {
        self.letter == letter && self.value() == Some(code)
    }
}

fn words(line: &str) -> Vec<Word<'_>> {
    word_regex()
        .captures_iter(line)
        .filter_map(|caps| {
            let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
            let raw = caps.get(2)?.as_str();
            Some(Word { letter, raw })
        })
        .collect()
}

fn arg(words: &[Word<'_>], letter: char) -> Option<f64> {
    words.iter().find(|w| w.letter == letter).and_then(Word::value)
}

/// Lower G-code lines
///
/// `G20`/`G21` set the running units (sticky across lines). The first other
/// G or M word is the line's opcode. Every line whose opcode is `G0` or `G1`
/// (leading zeros allowed) emits one move node; axes the line does not
/// mention stay unspecified.
pub fn lower_gcode(instructions: &[String]) -> Vec<IrNode> {
    let mut units: Option<Units> = None;
    let mut irs = Vec::new();

    for instruction in instructions {
        let line = strip_comment(instruction);
        if line.is_empty() {
            continue;
        }
        let words = words(&line);

        for word in words.iter().filter(|w| w.letter == 'G') {
            if word.is_code('G', 20.0) {
                units = Some(Units::Inches);
            } else if word.is_code('G', 21.0) {
                units = Some(Units::Millimeters);
            }
        }

        let Some(opcode) = words
            .iter()
            .filter(|w| !(w.is_code('G', 20.0) || w.is_code('G', 21.0)))
            .find(|w| w.letter == 'G' || w.letter == 'M')
        else {
            tracing::trace!("Skipping G-code line without opcode: {}", line);
            continue;
        };
        if !(opcode.is_code('G', 0.0) || opcode.is_code('G', 1.0)) {
            tracing::trace!("Skipping non-motion opcode {}{}", opcode.letter, opcode.raw);
            continue;
        }

        let args = IrArgs {
            x: arg(&words, 'X'),
            y: arg(&words, 'Y'),
            z: arg(&words, 'Z'),
            f: arg(&words, 'F'),
            dx: None,
            dy: None,
        };
        let state = IrState {
            units,
            tool_on_bed: true,
            clockwise: None,
        };
        irs.push(IrNode::new(
            Op::Move,
            format!("{}{}", opcode.letter, opcode.raw),
            args,
            state,
        ));
    }

    irs
}
