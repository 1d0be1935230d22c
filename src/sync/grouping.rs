//! Date separators and labels, derived fresh from the current sequence.

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use crate::common::ChatMessage;

const TIME_FORMAT: &str = "%-I:%M %p";
const DATE_FORMAT: &str = "%b %-d, %Y";

/// One message as the rendering surface needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow<'a> {
    pub message: &'a ChatMessage,
    /// Present when a date separator goes above this message.
    pub date_label: Option<String>,
    pub time_label: String,
}

pub fn calendar_date<Tz: TimeZone>(timestamp: &DateTime<FixedOffset>, zone: &Tz) -> NaiveDate {
    timestamp.with_timezone(zone).date_naive()
}

/// True for the first message and for every message whose calendar date in
/// `zone` differs from the one before it.
pub fn shows_date_separator<Tz: TimeZone>(messages: &[ChatMessage], index: usize, zone: &Tz) -> bool {
    let Some(current) = messages.get(index) else {
        return false;
    };
    match index.checked_sub(1).and_then(|previous| messages.get(previous)) {
        Some(previous) => {
            calendar_date(&current.timestamp, zone) != calendar_date(&previous.timestamp, zone)
        }
        None => true,
    }
}

pub fn date_separators<Tz: TimeZone>(messages: &[ChatMessage], zone: &Tz) -> Vec<bool> {
    (0..messages.len())
        .map(|index| shows_date_separator(messages, index, zone))
        .collect()
}

/// Short time, e.g. "3:45 PM".
pub fn format_time<Tz>(timestamp: &DateTime<FixedOffset>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(zone).format(TIME_FORMAT).to_string()
}

/// Medium date, e.g. "Aug 30, 2024".
pub fn format_date<Tz>(timestamp: &DateTime<FixedOffset>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(zone).format(DATE_FORMAT).to_string()
}

pub fn rows<'a, Tz>(messages: &'a [ChatMessage], zone: &Tz) -> Vec<MessageRow<'a>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date_separators(messages, zone)
        .into_iter()
        .zip(messages)
        .map(|(separator, message)| MessageRow {
            message,
            date_label: separator.then(|| format_date(&message.timestamp, zone)),
            time_label: format_time(&message.timestamp, zone),
        })
        .collect()
}
