//! Cast credit parser
//!
//! TheTVDB stores guest stars as `"Name (Role1, Role2)"`, but the upstream
//! tokenizer splits on every comma, so one logical entry can arrive spread
//! over several array slots:
//!
//! ```text
//! ["Jane Doe (Hero", "Sidekick)", "Solo Actor"]
//! ```
//!
//! The parser re-joins those slots with a two-state scan.

use crate::types::{PersonCredit, PersonKind, RawEpisodeRecord};

/// Separator placed between re-joined role fragments.
const ROLE_SEPARATOR: &str = ", ";

enum ScanState<'a> {
    /// Looking for the next `(` that opens a role list
    SeekOpenParen,
    /// Inside a role list that has not been closed yet
    AccumulatingRole {
        name: &'a str,
        fragments: Vec<&'a str>,
    },
}

/// Parse raw guest star strings into credits.
///
/// Every entry ends up either as its own credit or as a role fragment of
/// the credit opened before it. A role list that is never closed runs to
/// the end of the input. An entry that opens and closes its role list in
/// the same slot, like `"Name (Role)"`, is a complete credit and never
/// absorbs the entry after it.
///
/// # Examples
/// ```
/// use tvdb_core::parser::parse_guest_stars;
///
/// let credits = parse_guest_stars(&["Jane Doe (Hero", "Sidekick)", "Solo Actor"]);
/// assert_eq!(credits.len(), 2);
/// assert_eq!(credits[0].name, "Jane Doe");
/// assert_eq!(credits[0].role, "Hero, Sidekick");
/// assert_eq!(credits[1].name, "Solo Actor");
/// assert_eq!(credits[1].role, "");
/// ```
pub fn parse_guest_stars<S: AsRef<str>>(entries: &[S]) -> Vec<PersonCredit> {
    let mut credits = Vec::new();
    let mut state = ScanState::SeekOpenParen;

    for entry in entries {
        let entry: &str = entry.as_ref();
        state = match state {
            ScanState::SeekOpenParen => match entry.split_once('(') {
                None => {
                    credits.push(PersonCredit::new(entry, PersonKind::GuestStar));
                    ScanState::SeekOpenParen
                }
                // Role list opened and closed in the same slot
                Some((name, roles)) if roles.contains(')') => {
                    credits.push(guest_star(name, &[roles.trim_end_matches(')')]));
                    ScanState::SeekOpenParen
                }
                Some((name, roles)) => ScanState::AccumulatingRole {
                    name,
                    fragments: vec![roles],
                },
            },
            ScanState::AccumulatingRole {
                name,
                mut fragments,
            } => {
                if entry.contains(')') {
                    fragments.push(entry.trim_end_matches(')'));
                    credits.push(guest_star(name, &fragments));
                    ScanState::SeekOpenParen
                } else {
                    fragments.push(entry);
                    ScanState::AccumulatingRole { name, fragments }
                }
            }
        };
    }

    if let ScanState::AccumulatingRole { name, fragments } = state {
        credits.push(guest_star(name, &fragments));
    }

    credits
}

fn guest_star(name: &str, fragments: &[&str]) -> PersonCredit {
    PersonCredit::with_role(name.trim(), PersonKind::GuestStar, fragments.join(ROLE_SEPARATOR))
}

/// Map plain name lists (directors, writers) one-to-one onto credits.
pub fn parse_people<S: AsRef<str>>(names: &[S], kind: PersonKind) -> Vec<PersonCredit> {
    names
        .iter()
        .map(|name| {
            let name: &str = name.as_ref();
            PersonCredit::new(name, kind)
        })
        .collect()
}

/// All credits of a record: directors, then guest stars, then writers.
pub fn parse_credits(record: &RawEpisodeRecord) -> Vec<PersonCredit> {
    let mut people = parse_people(&record.directors, PersonKind::Director);
    people.extend(parse_guest_stars(&record.guest_stars));
    people.extend(parse_people(&record.writers, PersonKind::Writer));
    people
}
