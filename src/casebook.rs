//! The ten cases of the investigation and their validation heuristics.
//!
//! Each case gates progress behind a predicate over a query result. The
//! predicates are deliberately content-addressed heuristics, not proofs:
//! they fish result cells for a two-character code, an HH:MM time, a signed
//! witness name, or a value carried over from an earlier case, and the
//! ordering-sensitive cases only compare the first two rows. Later cases
//! consume what earlier ones extracted, so the chain is sensitive to the
//! seeded narrative text in [`crate::dataset`].

use lazy_static::lazy_static;
use regex::Regex;

use crate::gateway::{QueryResult, Value};
use crate::progression::{Carried, CarriedForward};

/// Keys in the carried-forward map.
pub const KEY_CODE: &str = "code";
pub const KEY_TARGET_CASE: &str = "target_case";
pub const KEY_TIMESTAMP: &str = "timestamp";
pub const KEY_SUSPECT: &str = "suspect";
pub const KEY_WITNESS: &str = "key_witness";

/// Suspicion score a suspect must carry before the board signs the charge.
const CHARGE_THRESHOLD: i64 = 8;

pub type Predicate = fn(&QueryResult, &mut CarriedForward) -> bool;

pub struct Validation {
    pub required_columns: &'static [&'static str],
    pub min_rows: usize,
    pub predicate: Predicate,
}

pub struct Case {
    pub id: u32,
    pub title: &'static str,
    pub story: &'static str,
    pub task: &'static str,
    pub validation: Validation,
    /// Tables that become available to the builder once this case closes.
    pub unlocks: &'static [&'static str],
    pub completion: &'static str,
}

pub fn case_by_id(case_id: u32) -> Option<&'static Case> {
    CASEBOOK.iter().find(|case| case.id == case_id)
}

pub fn case_index(case_id: u32) -> Option<usize> {
    CASEBOOK.iter().position(|case| case.id == case_id)
}

lazy_static! {
    /// Two-character locker codes like `B7`.
    static ref CODE: Regex = Regex::new(r"\b([A-Z][0-9])\b").unwrap();
    /// Wall-clock times like `21:45`.
    static ref CLOCK: Regex = Regex::new(r"\b(?:[01]?\d|2[0-3]):[0-5]\d\b").unwrap();
    /// Witness signatures like `signed: Aya Kline`.
    static ref SIGNATURE: Regex = Regex::new(r"signed:\s*([A-Z][A-Za-z .'-]*[A-Za-z])").unwrap();
}

// ------------- Predicate helpers -------------

fn row_text(row: &[Value]) -> String {
    let mut text = String::new();
    for cell in row {
        text.push_str(&cell.to_string());
        text.push(' ');
    }
    text
}

fn contains_anywhere(result: &QueryResult, needle: &str) -> bool {
    result
        .rows
        .iter()
        .any(|row| row_text(row).contains(needle))
}

/// First whole match of `pattern` anywhere in the result, scanning rows in
/// order and cells left to right.
fn find_first(result: &QueryResult, pattern: &Regex) -> Option<String> {
    for row in &result.rows {
        for cell in row {
            if let Some(found) = pattern.find(&cell.to_string()) {
                return Some(found.as_str().to_string());
            }
        }
    }
    None
}

fn carried_text(carried: &CarriedForward, key: &str) -> Option<String> {
    carried.get(key).and_then(|v| v.as_str().map(String::from))
}

/// Ordering heuristic: only the first two rows are compared, numerically,
/// on the named column.
fn first_two_descending(result: &QueryResult, column: &str) -> bool {
    let index = match result.column_index(column) {
        Some(index) => index,
        None => return false,
    };
    let first = result
        .rows
        .first()
        .and_then(|row| row.get(index))
        .and_then(Value::as_i64);
    let second = result
        .rows
        .get(1)
        .and_then(|row| row.get(index))
        .and_then(Value::as_i64);
    match (first, second) {
        (Some(a), Some(b)) => a >= b,
        _ => false,
    }
}

// ------------- Case predicates -------------

fn phantom_receipt(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    match find_first(result, &CODE) {
        Some(code) => {
            carried.insert(KEY_CODE.to_string(), Carried::Text(code));
            true
        }
        None => false,
    }
}

fn echoes_of_the_code(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    let code = match carried_text(carried, KEY_CODE) {
        Some(code) => code,
        None => return false,
    };
    let case_column = match result.column_index("case_id") {
        Some(index) => index,
        None => return false,
    };
    for row in &result.rows {
        if !row_text(row).contains(&code) {
            continue;
        }
        let id = match row.get(case_column).and_then(Value::as_i64) {
            Some(id) => id,
            None => continue,
        };
        if id != 1 {
            carried.insert(KEY_TARGET_CASE.to_string(), Carried::Num(id));
            return true;
        }
    }
    false
}

fn what_the_locker_held(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    match find_first(result, &CLOCK) {
        Some(time) => {
            carried.insert(KEY_TIMESTAMP.to_string(), Carried::Text(time));
            true
        }
        None => false,
    }
}

fn weight_of_the_files(result: &QueryResult, _carried: &mut CarriedForward) -> bool {
    first_two_descending(result, "severity")
}

fn persons_of_interest(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    if !first_two_descending(result, "suspicion") {
        return false;
    }
    let name_column = match result.column_index("name") {
        Some(index) => index,
        None => return false,
    };
    let name = result
        .rows
        .first()
        .and_then(|row| row.get(name_column))
        .and_then(|cell| cell.as_str().map(String::from));
    match name {
        Some(name) => {
            carried.insert(KEY_SUSPECT.to_string(), Carried::Text(name));
            true
        }
        None => false,
    }
}

fn the_alibi_that_wasnt(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    let suspect = match carried_text(carried, KEY_SUSPECT) {
        Some(suspect) => suspect,
        None => return false,
    };
    let time = match carried_text(carried, KEY_TIMESTAMP) {
        Some(time) => time,
        None => return false,
    };
    contains_anywhere(result, &suspect) && contains_anywhere(result, &time)
}

fn voices_at_the_station(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    if !first_two_descending(result, "reliability") {
        return false;
    }
    let first_row = match result.rows.first() {
        Some(row) => row,
        None => return false,
    };
    let signature = first_row.iter().find_map(|cell| {
        SIGNATURE
            .captures(&cell.to_string())
            .map(|captures| captures[1].to_string())
    });
    match signature {
        Some(witness) => {
            carried.insert(KEY_WITNESS.to_string(), Carried::Text(witness));
            true
        }
        None => false,
    }
}

fn the_witness_account(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    let witness = match carried_text(carried, KEY_WITNESS) {
        Some(witness) => witness,
        None => return false,
    };
    let suspect = match carried_text(carried, KEY_SUSPECT) {
        Some(suspect) => suspect,
        None => return false,
    };
    contains_anywhere(result, &witness) && contains_anywhere(result, &suspect)
}

fn decisive_evidence(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    let code = match carried_text(carried, KEY_CODE) {
        Some(code) => code,
        None => return false,
    };
    let suspect = match carried_text(carried, KEY_SUSPECT) {
        Some(suspect) => suspect,
        None => return false,
    };
    // Both tokens must land in the same row for the evidence to be decisive.
    result.rows.iter().any(|row| {
        let text = row_text(row);
        text.contains(&code) && text.contains(&suspect)
    })
}

fn closing_the_case(result: &QueryResult, carried: &mut CarriedForward) -> bool {
    let suspect = match carried_text(carried, KEY_SUSPECT) {
        Some(suspect) => suspect,
        None => return false,
    };
    let name_column = match result.column_index("name") {
        Some(index) => index,
        None => return false,
    };
    let suspicion_column = match result.column_index("suspicion") {
        Some(index) => index,
        None => return false,
    };
    let first_row = match result.rows.first() {
        Some(row) => row,
        None => return false,
    };
    let named = first_row
        .get(name_column)
        .and_then(Value::as_str)
        .map(|name| name == suspect)
        .unwrap_or(false);
    let suspicious = first_row
        .get(suspicion_column)
        .and_then(Value::as_i64)
        .map(|score| score >= CHARGE_THRESHOLD)
        .unwrap_or(false);
    named && suspicious
}

// ------------- The casebook -------------

pub static CASEBOOK: [Case; 10] = [
    Case {
        id: 1,
        title: "The Phantom Receipt",
        story: "An archive box sealed for years turned up a fresh receipt. Someone \
                slipped it in recently, and they left a note on the back.",
        task: "Open case file #1 and read the summary closely. Something on that \
               receipt is a lead.",
        validation: Validation {
            required_columns: &["case_title", "summary"],
            min_rows: 1,
            predicate: phantom_receipt,
        },
        unlocks: &[],
        completion: "A locker code, scribbled in pencil. Note it down; we will need it.",
    },
    Case {
        id: 2,
        title: "Echoes of the Code",
        story: "The code from the receipt has to point somewhere. If it shows up in \
                another file, the two cases are connected.",
        task: "Search the case files for the code you found, and identify the other \
               case that mentions it.",
        validation: Validation {
            required_columns: &["case_id", "case_title"],
            min_rows: 1,
            predicate: echoes_of_the_code,
        },
        unlocks: &["evidence"],
        completion: "The locker room case mentions the same code. The evidence log for \
                     it has just been released to you.",
    },
    Case {
        id: 3,
        title: "What the Locker Held",
        story: "Forensics catalogued everything recovered at the station. Most of it \
                is noise; the key items carry a flag.",
        task: "Pull the key evidence for the locker case, items and notes both. One of \
               the notes pins down a time.",
        validation: Validation {
            required_columns: &["item", "note"],
            min_rows: 2,
            predicate: what_the_locker_held,
        },
        unlocks: &[],
        completion: "The platform clock froze the scene in place. That time is our anchor.",
    },
    Case {
        id: 4,
        title: "Weight of the Files",
        story: "The captain wants the open files triaged before anyone burns another \
                night on a missing key.",
        task: "Rank the case files by severity, heaviest first, so the board reads \
               top-down.",
        validation: Validation {
            required_columns: &["case_title", "severity"],
            min_rows: 2,
            predicate: weight_of_the_files,
        },
        unlocks: &["suspects"],
        completion: "Priorities on the wall. The suspect register is open to you now.",
    },
    Case {
        id: 5,
        title: "Persons of Interest",
        story: "Three names keep coming up around the locker room. The register scores \
                how hard each one is to believe.",
        task: "List the suspects in the locker case from most to least suspicious.",
        validation: Validation {
            required_columns: &["name", "suspicion"],
            min_rows: 3,
            predicate: persons_of_interest,
        },
        unlocks: &[],
        completion: "One name sits on top of the pile. Keep your eye on him.",
    },
    Case {
        id: 6,
        title: "The Alibi That Wasn't",
        story: "Everyone has a story for that night. Stories with an exact time in \
                them have a way of unravelling.",
        task: "Pull your prime suspect's alibi and check it against the time on the \
               platform clock.",
        validation: Validation {
            required_columns: &["name", "alibi"],
            min_rows: 1,
            predicate: the_alibi_that_wasnt,
        },
        unlocks: &["witness_statements"],
        completion: "Home by the very minute the clock stopped, says he. The witness \
                     ledger is yours; see who else was watching.",
    },
    Case {
        id: 7,
        title: "Voices at the Station",
        story: "Statements pile up after a scene like that. Reliability scores sort \
                the watchers from the dreamers.",
        task: "Fetch the dependable statements on the locker case, most reliable \
               first, and note who signed the top one.",
        validation: Validation {
            required_columns: &["witness", "reliability", "statement"],
            min_rows: 2,
            predicate: voices_at_the_station,
        },
        unlocks: &[],
        completion: "A steady pair of eyes, and a signature to go with them.",
    },
    Case {
        id: 8,
        title: "The Witness Account",
        story: "One witness put a name to a face. Read the account in full before \
                anyone leans on it in an interview.",
        task: "Bring up everything your key witness said and confirm who they saw.",
        validation: Validation {
            required_columns: &["witness", "statement"],
            min_rows: 1,
            predicate: the_witness_account,
        },
        unlocks: &[],
        completion: "She saw him by the lockers. The account and the clock agree.",
    },
    Case {
        id: 9,
        title: "Decisive Evidence",
        story: "Testimony points; paper convicts. Somewhere in the evidence log the \
                code and the name sit side by side.",
        task: "Find the single piece of evidence that ties the locker code to your \
               suspect.",
        validation: Validation {
            required_columns: &["item", "note"],
            min_rows: 1,
            predicate: decisive_evidence,
        },
        unlocks: &[],
        completion: "A claim ticket with his name on it. That is the nail.",
    },
    Case {
        id: 10,
        title: "Closing the Case",
        story: "The board wants one page: who, and how sure. Make the charge sheet \
                speak for itself.",
        task: "Draw up the final record on your suspect, name and suspicion score, \
               ready for the charge.",
        validation: Validation {
            required_columns: &["name", "suspicion"],
            min_rows: 1,
            predicate: closing_the_case,
        },
        unlocks: &[],
        completion: "Charge signed. The phantom receipt, the locker and the claim \
                     ticket all point one way. Case closed, detective.",
    },
];
