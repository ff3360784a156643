//! Command line parsing

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use parkpro_core::config::parse_hhmm;
use parkpro_core::BookingId;

pub const USAGE: &str = "\
Usage: parkpro <command> [options]

Commands:
  suggest <apt> <start-date> <end-date>              List free slots for a stay
  book <apt> <slot> <start-date> <end-date>          Book one slot for a stay
  book-split <apt> <start-date> <end-date> <index>   Book a split suggestion by number
  cancel <booking-id>                                Cancel a booking
  log                                                Booking history, newest first
  status                                             Free slots right now
  roster                                             Apartments and their slots
  serve                                              Host the booking log over TCP

Options:
  --in HH:MM      Check-in time (default from settings)
  --out HH:MM     Check-out time (default from settings)
  --guest NAME    Guest name (default \"Guest\")

Dates are YYYY-MM-DD. <apt> is an apartment number or id, <slot> a slot
number or id.";

/// A malformed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stay dates with optional time overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayArgs {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

impl StayArgs {
    /// Check-in on the start date to check-out on the end date
    pub fn interval(
        &self,
        default_in: NaiveTime,
        default_out: NaiveTime,
    ) -> (NaiveDateTime, NaiveDateTime) {
        (
            self.start.and_time(self.check_in.unwrap_or(default_in)),
            self.end.and_time(self.check_out.unwrap_or(default_out)),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Suggest {
        apartment: String,
        stay: StayArgs,
    },
    Book {
        apartment: String,
        slot: String,
        stay: StayArgs,
        guest: Option<String>,
    },
    BookSplit {
        apartment: String,
        stay: StayArgs,
        /// 1-based, as printed by `suggest`
        index: usize,
        guest: Option<String>,
    },
    Cancel {
        booking_id: BookingId,
    },
    Log,
    Status,
    Roster,
    Serve,
    Help,
}

#[derive(Default)]
struct Options {
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    guest: Option<String>,
}

/// Split flags from positionals
fn split_options(args: &[String]) -> Result<(Vec<&str>, Options), UsageError> {
    let mut positionals = Vec::new();
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(String::as_str)
                .ok_or_else(|| UsageError(format!("{} needs a value", flag)))
        };
        match arg.as_str() {
            "--in" => options.check_in = Some(parse_time(value("--in")?)?),
            "--out" => options.check_out = Some(parse_time(value("--out")?)?),
            "--guest" => options.guest = Some(value("--guest")?.to_string()),
            flag if flag.starts_with("--") => {
                return Err(UsageError(format!("unknown option {}", flag)));
            }
            positional => positionals.push(positional),
        }
    }
    Ok((positionals, options))
}

fn parse_time(value: &str) -> Result<NaiveTime, UsageError> {
    parse_hhmm(value).map_err(|e| UsageError(e.to_string()))
}

fn parse_date(value: &str) -> Result<NaiveDate, UsageError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| UsageError(format!("invalid date `{}`, expected YYYY-MM-DD", value)))
}

fn expect_count(command: &str, positionals: &[&str], count: usize) -> Result<(), UsageError> {
    if positionals.len() == count {
        Ok(())
    } else {
        Err(UsageError(format!(
            "{} takes {} arguments, got {}",
            command,
            count,
            positionals.len()
        )))
    }
}

fn stay(start: &str, end: &str, options: &Options) -> Result<StayArgs, UsageError> {
    Ok(StayArgs {
        start: parse_date(start)?,
        end: parse_date(end)?,
        check_in: options.check_in,
        check_out: options.check_out,
    })
}

/// Parse arguments after the program name
pub fn parse(args: &[String]) -> Result<Command, UsageError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    let (pos, options) = split_options(rest)?;

    let command = match name.as_str() {
        "suggest" => {
            expect_count(name, &pos, 3)?;
            Command::Suggest {
                apartment: pos[0].to_string(),
                stay: stay(pos[1], pos[2], &options)?,
            }
        }
        "book" => {
            expect_count(name, &pos, 4)?;
            Command::Book {
                apartment: pos[0].to_string(),
                slot: pos[1].to_string(),
                stay: stay(pos[2], pos[3], &options)?,
                guest: options.guest,
            }
        }
        "book-split" => {
            expect_count(name, &pos, 4)?;
            let index = pos[3]
                .parse::<usize>()
                .ok()
                .filter(|i| *i > 0)
                .ok_or_else(|| UsageError(format!("invalid suggestion number `{}`", pos[3])))?;
            Command::BookSplit {
                apartment: pos[0].to_string(),
                stay: stay(pos[1], pos[2], &options)?,
                index,
                guest: options.guest,
            }
        }
        "cancel" => {
            expect_count(name, &pos, 1)?;
            let booking_id = pos[0]
                .parse()
                .map_err(|_| UsageError(format!("invalid booking id `{}`", pos[0])))?;
            Command::Cancel { booking_id }
        }
        "log" | "status" | "roster" | "serve" => {
            expect_count(name, &pos, 0)?;
            match name.as_str() {
                "log" => Command::Log,
                "status" => Command::Status,
                "roster" => Command::Roster,
                _ => Command::Serve,
            }
        }
        "help" | "-h" | "--help" => Command::Help,
        other => return Err(UsageError(format!("unknown command `{}`", other))),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_parse_suggest() {
        let command = parse(&args("suggest 6 2025-01-01 2025-01-03 --in 14:00")).unwrap();
        assert_eq!(
            command,
            Command::Suggest {
                apartment: "6".into(),
                stay: StayArgs {
                    start: date(1),
                    end: date(3),
                    check_in: NaiveTime::from_hms_opt(14, 0, 0),
                    check_out: None,
                },
            }
        );
    }

    #[test]
    fn test_parse_book_with_guest() {
        let command =
            parse(&args("book apt-6 118 2025-01-01 2025-01-02 --guest Ada --out 10:30")).unwrap();
        match command {
            Command::Book {
                apartment,
                slot,
                stay,
                guest,
            } => {
                assert_eq!(apartment, "apt-6");
                assert_eq!(slot, "118");
                assert_eq!(guest.as_deref(), Some("Ada"));
                assert_eq!(stay.check_out, NaiveTime::from_hms_opt(10, 30, 0));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_book_split_index() {
        assert!(matches!(
            parse(&args("book-split 6 2025-01-01 2025-01-03 2")),
            Ok(Command::BookSplit { index: 2, .. })
        ));
        assert!(parse(&args("book-split 6 2025-01-01 2025-01-03 0")).is_err());
        assert!(parse(&args("book-split 6 2025-01-01 2025-01-03 x")).is_err());
    }

    #[test]
    fn test_parse_cancel() {
        let id = BookingId::new();
        assert_eq!(
            parse(&args(&format!("cancel {}", id))).unwrap(),
            Command::Cancel { booking_id: id }
        );
        assert!(parse(&args("cancel nope")).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&args("suggest 6 2025-01-01")).is_err());
        assert!(parse(&args("suggest 6 01/01/2025 2025-01-03")).is_err());
        assert!(parse(&args("suggest 6 2025-01-01 2025-01-03 --in")).is_err());
        assert!(parse(&args("suggest 6 2025-01-01 2025-01-03 --color red")).is_err());
        assert!(parse(&args("status now")).is_err());
        assert!(parse(&args("fly")).is_err());
    }

    #[test]
    fn test_no_arguments_is_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(parse(&args("--help")).unwrap(), Command::Help);
        assert_eq!(parse(&args("log")).unwrap(), Command::Log);
    }

    #[test]
    fn test_stay_interval_defaults() {
        let stay = StayArgs {
            start: date(1),
            end: date(3),
            check_in: None,
            check_out: NaiveTime::from_hms_opt(9, 0, 0),
        };
        let (start, end) = stay.interval(
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        );
        assert_eq!(start, date(1).and_hms_opt(16, 0, 0).unwrap());
        assert_eq!(end, date(3).and_hms_opt(9, 0, 0).unwrap());
    }
}
