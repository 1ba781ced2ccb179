use sgp4::Elements;

use crate::elements::error::ElementsError;
use crate::elements::types::OrbitalElementRecord;

/// Parse a multi-satellite element feed into records, in feed order.
///
/// Records whose lines sgp4 rejects are skipped with a warning so that every
/// returned name can be propagated. A feed that contains element lines but
/// not a single usable record is rejected as a whole.
pub fn parse_feed(
    content: &str,
    source_location: &str,
) -> Result<Vec<OrbitalElementRecord>, ElementsError> {
    let candidates = split_records(content);
    let total = candidates.len();
    let mut records = Vec::with_capacity(total);

    for raw in candidates {
        let name = raw.name.map(str::to_string);
        let elements =
            match Elements::from_tle(name.clone(), raw.line1.as_bytes(), raw.line2.as_bytes()) {
                Ok(e) => e,
                Err(e) => {
                    log::warn!(
                        "Skipping malformed element set {:?} from {}: {}",
                        raw.name.unwrap_or("<unnamed>"),
                        source_location,
                        e
                    );
                    continue;
                }
            };

        records.push(OrbitalElementRecord {
            name: name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id)),
            line1: raw.line1.to_string(),
            line2: raw.line2.to_string(),
        });
    }

    if total > 0 && records.is_empty() {
        return Err(ElementsError::InvalidFeed {
            source_location: source_location.to_string(),
            message: format!("none of {} element sets could be parsed", total),
        });
    }

    Ok(records)
}

/// Element lines of one record, borrowed from the feed text
struct RawRecord<'a> {
    name: Option<&'a str>,
    line1: &'a str,
    line2: &'a str,
}

/// Split feed text into records. Both the 3-line form (optionally with a
/// `0 ` name prefix) and the bare 2-line form are accepted; lines that
/// belong to neither are skipped.
fn split_records(content: &str) -> Vec<RawRecord<'_>> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut records = Vec::new();
    let mut rest = lines.as_slice();
    loop {
        rest = match rest {
            [line1, line2, tail @ ..]
                if is_element_line(line1, '1') && is_element_line(line2, '2') =>
            {
                records.push(RawRecord {
                    name: None,
                    line1: *line1,
                    line2: *line2,
                });
                tail
            }
            [name, line1, line2, tail @ ..]
                if is_element_line(line1, '1') && is_element_line(line2, '2') =>
            {
                let name = *name;
                records.push(RawRecord {
                    name: Some(name.strip_prefix("0 ").unwrap_or(name).trim()),
                    line1: *line1,
                    line2: *line2,
                });
                tail
            }
            [_, tail @ ..] => tail,
            [] => break,
        };
    }

    records
}

fn is_element_line(line: &str, number: char) -> bool {
    line.strip_prefix(number)
        .is_some_and(|rest| rest.starts_with(' '))
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const ISS_LINE1: &str =
        "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    pub const ISS_LINE2: &str =
        "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";
    pub const CSS_LINE1: &str =
        "1 48274U 21035A   21132.46447361  .00001525  00000-0  24693-4 0  9991";
    pub const CSS_LINE2: &str =
        "2 48274  41.4704 153.1614 0006126 239.7232 261.4981 15.62325866  3087";

    pub fn stations_feed() -> String {
        format!(
            "ISS (ZARYA)\n{}\n{}\nCSS (TIANHE)\n{}\n{}\n",
            ISS_LINE1, ISS_LINE2, CSS_LINE1, CSS_LINE2
        )
    }
}
