use std::{io::BufRead, path::Path};

use quick_xml::events::{BytesStart, Event as XmlEvent};
use uom::si::f64::Time;

use super::{Event, EventKind};
use crate::{report::RecordIssues, util::fs, AnalysisError};

/// number of decoded events between two progress lines in the log
pub const PROGRESS_LOG_INTERVAL: u64 = 1_000_000;

/// lazily decodes `<event>` elements from a MATSim event file.
///
/// the reader is forward-only and holds a single reusable buffer, so memory
/// use does not grow with the size of the log. malformed events are skipped
/// and counted in [`EventReader::issues`] unless the reader is strict, in
/// which case they are returned as [`AnalysisError::MalformedRecord`]. an XML
/// syntax error ends the stream after being returned once.
pub struct EventReader<R: BufRead> {
    reader: quick_xml::Reader<R>,
    buf: Vec<u8>,
    source_name: String,
    strict: bool,
    issues: RecordIssues,
    events_read: u64,
    done: bool,
}

/// opens an event file, decoding gzip when the file name ends in `.gz`.
pub fn open_events(
    path: &Path,
    strict: bool,
) -> Result<EventReader<Box<dyn BufRead + Send>>, AnalysisError> {
    let inner = fs::open_buffered(path)?;
    let source_name = path.to_string_lossy().to_string();
    Ok(EventReader::new(inner, &source_name, strict))
}

impl<R: BufRead> EventReader<R> {
    pub fn new(inner: R, source_name: &str, strict: bool) -> EventReader<R> {
        let mut reader = quick_xml::Reader::from_reader(inner);
        reader.config_mut().trim_text(true);
        EventReader {
            reader,
            buf: Vec::new(),
            source_name: source_name.to_string(),
            strict,
            issues: RecordIssues::default(),
            events_read: 0,
            done: false,
        }
    }

    /// problems recovered from so far
    pub fn issues(&self) -> &RecordIssues {
        &self.issues
    }

    /// number of events decoded so far, including unknown kinds
    pub fn events_read(&self) -> u64 {
        self.events_read
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            let parsed = match self.reader.read_event_into(&mut self.buf) {
                Ok(XmlEvent::Empty(e)) | Ok(XmlEvent::Start(e))
                    if e.name().as_ref() == b"event" =>
                {
                    Some(decode_event(&e))
                }
                Ok(XmlEvent::Eof) => {
                    self.done = true;
                    log::debug!(
                        "finished reading {} events from {}",
                        self.events_read,
                        self.source_name
                    );
                    return None;
                }
                Ok(_) => None,
                Err(e) => {
                    self.done = true;
                    return Some(Err(AnalysisError::CorruptSource {
                        source_name: self.source_name.clone(),
                        position,
                        message: e.to_string(),
                    }));
                }
            };

            match parsed {
                None => continue,
                Some(Ok(event)) => {
                    self.events_read += 1;
                    if self.events_read % PROGRESS_LOG_INTERVAL == 0 {
                        log::info!(
                            "processed {} events from {}",
                            self.events_read,
                            self.source_name
                        );
                    }
                    if let Event::Unknown { kind, .. } = &event {
                        self.issues.unknown_event(kind);
                    }
                    return Some(Ok(event));
                }
                Some(Err(message)) => {
                    let error = AnalysisError::MalformedRecord {
                        source_name: self.source_name.clone(),
                        position,
                        message,
                    };
                    if self.strict {
                        return Some(Err(error));
                    }
                    self.issues.malformed(&error);
                }
            }
        }
    }
}

/// decodes the attributes of a single `<event>` element into an [`Event`].
fn decode_event(element: &BytesStart) -> Result<Event, String> {
    let mut time: Option<String> = None;
    let mut kind: Option<String> = None;
    let mut person: Option<String> = None;
    let mut amount: Option<String> = None;
    let mut purpose: Option<String> = None;
    let mut transaction_partner: Option<String> = None;
    let mut link: Option<String> = None;
    let mut vehicle: Option<String> = None;

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| format!("invalid attribute: {e}"))?;
        let slot = match attribute.key.as_ref() {
            b"time" => &mut time,
            b"type" => &mut kind,
            b"person" => &mut person,
            b"amount" => &mut amount,
            b"purpose" => &mut purpose,
            b"transactionPartner" => &mut transaction_partner,
            b"link" => &mut link,
            b"vehicle" => &mut vehicle,
            _ => continue,
        };
        let value = attribute
            .unescape_value()
            .map_err(|e| format!("invalid attribute value: {e}"))?;
        *slot = Some(value.into_owned());
    }

    // range checks belong to the aggregator's out-of-domain policy
    let time = Time::new::<uom::si::time::second>(parse_number("time", time.as_deref())?);
    let kind = kind.ok_or_else(|| String::from("event has no 'type' attribute"))?;

    match EventKind::from_type_attribute(&kind) {
        EventKind::PersonMoney => Ok(Event::PersonMoney {
            time,
            person: required("person", person, &kind)?,
            amount: parse_number("amount", amount.as_deref())?,
            purpose,
            transaction_partner,
        }),
        EventKind::LinkEnter => Ok(Event::LinkEnter {
            time,
            link: required("link", link, &kind)?,
            vehicle: required("vehicle", vehicle, &kind)?,
        }),
        EventKind::LinkLeave => Ok(Event::LinkLeave {
            time,
            link: required("link", link, &kind)?,
            vehicle: required("vehicle", vehicle, &kind)?,
        }),
        EventKind::Unknown => Ok(Event::Unknown { time, kind }),
    }
}

fn parse_number(name: &str, value: Option<&str>) -> Result<f64, String> {
    let raw = value.ok_or_else(|| format!("event has no '{name}' attribute"))?;
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("'{name}' value '{raw}' is not a number: {e}"))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("'{name}' value '{raw}' is not finite"))
    }
}

fn required(name: &str, value: Option<String>, kind: &str) -> Result<String, String> {
    value.ok_or_else(|| format!("'{kind}' event has no '{name}' attribute"))
}
