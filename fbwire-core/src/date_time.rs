//! Conversions between `chrono`'s calendar types and Firebird's on-the-wire
//! `ISC_DATE`/`ISC_TIME`/`ISC_TIMESTAMP` encodings, plus `ToParam` impls so
//! callers can pass `NaiveDate`/`NaiveTime`/`NaiveDateTime` values directly.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{ibase, Param, ToParam};

const FRACTION_TO_NANOS: u32 = 1_000_000_000 / ibase::ISC_TIME_SECONDS_PRECISION;

/// Convert a numeric day to a calendar date. Ported from the Firebird source.
///
/// Calendars are divided into 4 year cycles: 3 non-leap years, and 1 leap
/// year. Each cycle takes 365*4 + 1 == 1461 days. There is a further cycle
/// of 100 4 year cycles. Every 100 years, the normally expected leap year is
/// not present. Every 400 years it is. This cycle takes 100*1461 - 3 ==
/// 146097 days.
pub fn decode_date(date: ibase::ISC_DATE) -> NaiveDate {
    let mut nday = date;

    nday += 2400001 - 1721119;

    let century = (4 * nday - 1) / 146097;
    nday = 4 * nday - 1 - 146097 * century;

    let mut day = nday / 4;
    nday = (4 * day + 3) / 1461;
    day = 4 * day + 3 - 1461 * nday;
    day = (day + 4) / 4;

    let mut month = (5 * day - 3) / 153;
    day = 5 * day - 3 - 153 * month;
    day = (day + 5) / 5;

    let mut year = 100 * century + nday;

    if month < 10 {
        month += 3;
    } else {
        month -= 9;
        year += 1;
    };

    NaiveDate::from_ymd(year, month as u32, day as u32)
}

/// Convert a calendar date to Firebird's numeric day. Ported from the
/// Firebird source.
pub fn encode_date(date: NaiveDate) -> ibase::ISC_DATE {
    let day = date.day() as i64;
    let mut month = date.month() as i64;
    let mut year = date.year() as i64;

    if month > 2 {
        month -= 3;
    } else {
        month += 9;
        year -= 1;
    }

    let c = year / 100;
    let ya = year - 100 * c;

    ((146097 * c) / 4 + (1461 * ya) / 4 + (153 * month + 2) / 5 + day + 1721119 - 2400001)
        as ibase::ISC_DATE
}

/// Convert a numeric time to a time of day. Ported from the Firebird source.
pub fn decode_time(time: ibase::ISC_TIME) -> NaiveTime {
    let mut ntime = time;

    let hours = ntime / (3600 * ibase::ISC_TIME_SECONDS_PRECISION);
    ntime %= 3600 * ibase::ISC_TIME_SECONDS_PRECISION;

    let minutes = ntime / (60 * ibase::ISC_TIME_SECONDS_PRECISION);
    ntime %= 60 * ibase::ISC_TIME_SECONDS_PRECISION;

    let seconds = ntime / ibase::ISC_TIME_SECONDS_PRECISION;
    let fraction = ntime % ibase::ISC_TIME_SECONDS_PRECISION;

    NaiveTime::from_hms_nano(hours, minutes, seconds, fraction * FRACTION_TO_NANOS)
}

/// Convert a time of day to Firebird's numeric time.
pub fn encode_time(time: NaiveTime) -> ibase::ISC_TIME {
    let hours = time.hour();
    let minutes = time.minute();
    let seconds = time.second();
    let fraction = time.nanosecond() / FRACTION_TO_NANOS;

    ((hours * 60 + minutes) * 60 + seconds) * ibase::ISC_TIME_SECONDS_PRECISION + fraction
}

/// Convert a numeric timestamp to a `NaiveDateTime`.
pub fn decode_timestamp(ts: ibase::ISC_TIMESTAMP) -> NaiveDateTime {
    decode_date(ts.timestamp_date).and_time(decode_time(ts.timestamp_time))
}

/// Convert a `NaiveDateTime` to Firebird's numeric timestamp.
pub fn encode_timestamp(dt: NaiveDateTime) -> ibase::ISC_TIMESTAMP {
    ibase::ISC_TIMESTAMP {
        timestamp_date: encode_date(dt.date()),
        timestamp_time: encode_time(dt.time()),
    }
}

impl ToParam for NaiveDateTime {
    fn to_param(self) -> Param {
        Param::Timestamp(encode_timestamp(self))
    }
}

impl ToParam for NaiveDate {
    fn to_param(self) -> Param {
        // Mimics Firebird's own date->timestamp widening.
        self.and_time(NaiveTime::from_hms(0, 0, 0)).to_param()
    }
}

impl ToParam for NaiveTime {
    fn to_param(self) -> Param {
        // Mimics Firebird's own time->timestamp widening: today's date.
        chrono::Utc::today().naive_utc().and_time(self).to_param()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_round_trips_through_firebird_epoch() {
        let epoch = NaiveDate::from_ymd(1858, 11, 17);
        assert_eq!(encode_date(epoch), 0);
        assert_eq!(decode_date(0), epoch);
    }

    #[test]
    fn date_round_trips_for_a_modern_date() {
        let d = NaiveDate::from_ymd(2020, 1, 1);
        assert_eq!(decode_date(encode_date(d)), d);
    }

    #[test]
    fn time_round_trips_with_microsecond_precision() {
        let t = NaiveTime::from_hms_micro(13, 45, 7, 250_000);
        let encoded = encode_time(t);
        assert_eq!(decode_time(encoded), t);
    }

    #[test]
    fn naive_date_converts_to_midnight_timestamp_param() {
        let d = NaiveDate::from_ymd(2020, 1, 1);
        match d.to_param() {
            Param::Timestamp(ts) => {
                assert_eq!(ts.timestamp_date, encode_date(d));
                assert_eq!(ts.timestamp_time, 0);
            }
            _ => panic!("expected Param::Timestamp"),
        }
    }
}
