use unsegen::input::*;

use nom::{
    character::complete::{alpha1, digit0, space1},
    combinator::{all_consuming, map_opt, opt, rest},
    sequence::{preceded, tuple},
    IResult,
};

use super::context::{Context, Mode};
use crate::calendar::YearMonth;
use crate::error::{Error, ErrorKind};

pub type ActionResult = Result<(), Error>;

pub enum Action {
    Arg(fn(&mut Context, &str) -> ActionResult),
    NoArg(fn(&mut Context) -> ActionResult),
    Repeatable(fn(&mut Context, u32) -> ActionResult),
}

fn out_of_range(what: &str) -> Error {
    Error::new(
        ErrorKind::CommandParse,
        &format!("{} lies outside of the calendar range", what),
    )
}

const COMMANDS: &[(&str, Action)] = &[
    (
        "next",
        Action::Repeatable(|c, n| {
            if c.go_by(n as i64) {
                Ok(())
            } else {
                Err(out_of_range("target month"))
            }
        }),
    ),
    (
        "prev",
        Action::Repeatable(|c, n| {
            if c.go_by(-(n as i64)) {
                Ok(())
            } else {
                Err(out_of_range("target month"))
            }
        }),
    ),
    (
        "goto",
        Action::Arg(|c, arg| {
            let month: YearMonth = arg.parse()?;
            if c.jump_to(month) {
                Ok(())
            } else {
                Err(out_of_range(&month.to_string()))
            }
        }),
    ),
    (
        "today",
        Action::NoArg(|c| {
            c.jump_to_today();
            Ok(())
        }),
    ),
    (
        "clear",
        Action::NoArg(|c| {
            c.clear_selection();
            Ok(())
        }),
    ),
];

fn action(input: &str) -> IResult<&str, &'static (&'static str, Action)> {
    map_opt(alpha1, |name: &str| {
        COMMANDS.iter().find(|(candidate, _)| *candidate == name)
    })(input)
}

fn parse_count(s: &str) -> Result<u32, Error> {
    s.parse::<u32>().map_err(|_| {
        Error::new(
            ErrorKind::CommandParse,
            &format!("'{}' is not a count", s),
        )
    })
}

/// Runs a command line of the form `[count]name [argument]`.
pub fn run_command(context: &mut Context, cmd: &str) -> ActionResult {
    let cmd = cmd.trim();
    let parsed: IResult<&str, _> =
        all_consuming(tuple((digit0, action, opt(preceded(space1, rest)))))(cmd);

    let (repeat, (name, act), arg) = match parsed {
        Ok((_, parsed)) => parsed,
        Err(_) => {
            return Err(Error::new(
                ErrorKind::CommandParse,
                &format!("unknown command '{}'", cmd),
            ))
        }
    };
    let arg = arg.map(str::trim).filter(|a| !a.is_empty());

    log::debug!("Running command '{}' ({:?}, {:?})", name, repeat, arg);

    match (act, repeat.is_empty(), arg) {
        (Action::Repeatable(a), true, None) => a(context, 1),
        (Action::Repeatable(a), true, Some(count)) => a(context, parse_count(count)?),
        (Action::Repeatable(a), false, None) => a(context, parse_count(repeat)?),
        (Action::Arg(a), true, Some(arg)) => a(context, arg),
        (Action::NoArg(a), true, None) => a(context),
        _ => Err(Error::new(
            ErrorKind::CommandParse,
            &format!("wrong arguments for '{}'", name),
        )),
    }
}

pub struct CommandParser<'a> {
    context: &'a mut Context,
}

impl<'a> CommandParser<'a> {
    pub fn new(context: &'a mut Context) -> Self {
        CommandParser { context }
    }

    fn report_error(&mut self, error: Error) {
        log::warn!("{}", error);
        self.context.last_error_message = Some(format!("{}", error));
    }
}

impl Behavior for CommandParser<'_> {
    fn input(mut self, input: Input) -> Option<Input> {
        if let Event::Key(Key::Char('\n')) = input.event {
            let cmd = self.context.command_line_mut().finish_line().to_owned();
            if let Err(e) = run_command(self.context, &cmd) {
                self.report_error(e);
            } else {
                self.context.last_error_message = None;
                self.context.mode = Mode::Normal;
            }
            None
        } else {
            Some(input)
        }
    }
}
