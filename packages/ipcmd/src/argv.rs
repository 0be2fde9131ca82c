// Command-line preprocessing that runs before argh sees the arguments.

/// Options of `semop` that take a value, which must be skipped together with it.
const SEMOP_VALUE_OPTIONS: [&str; 2] = ["-s", "--semid"];

/// Makes a leading negative `semop` operand such as `-1` or `-2u` parse as an operand instead of
/// an unknown option.
///
/// argh treats any argument starting with `-` as an option until the first positional argument.
/// This inserts `--` in front of the first negative operand that follows the `semop` options, so
/// `ipcmd semop -s 5 -1 : cmd` is understood as `ipcmd semop -s 5 -- -1 : cmd`. Arguments of
/// other commands are returned unchanged.
#[must_use]
pub fn protect_negative_operands(mut args: Vec<String>) -> Vec<String> {
    if args.get(1).is_none_or(|command| command != "semop") {
        return args;
    }

    let mut skip_value = false;
    let mut first_operand = None;

    for (index, arg) in args.iter().enumerate().skip(2) {
        if skip_value {
            skip_value = false;
            continue;
        }

        if arg == "--" || !arg.starts_with('-') {
            break;
        }

        if is_negative_operand(arg) {
            first_operand = Some(index);
            break;
        }

        skip_value = SEMOP_VALUE_OPTIONS.contains(&arg.as_str());
    }

    if let Some(index) = first_operand {
        args.insert(index, "--".to_string());
    }

    args
}

fn is_negative_operand(arg: &str) -> bool {
    arg.strip_prefix('-')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}
