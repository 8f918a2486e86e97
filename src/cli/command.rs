use snafu::Snafu;

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Pwd,
    Ls { path: Option<String> },
    Cd { path: Option<String> },
    Mkdir { paths: Vec<String> },
    Touch { paths: Vec<String> },
    Write { path: String, text: String },
    Cat { path: String },
    Rm { path: String },
    Mv { path: String, destination: String },
    Cp { path: String, destination: String },
    Rename { path: String, name: String },
    Echo { text: String },
}

impl TryFrom<&str> for ShellCommand {
    type Error = CommandParseError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandParseError::Empty)?;
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("pwd", []) => ShellCommand::Pwd,
            ("ls", [] | [_]) => ShellCommand::Ls {
                path: args.first().map(|s| s.to_string()),
            },
            ("cd", [] | [_]) => ShellCommand::Cd {
                path: args.first().map(|s| s.to_string()),
            },
            ("mkdir", [_, ..]) => ShellCommand::Mkdir {
                paths: owned(&args),
            },
            ("touch", [_, ..]) => ShellCommand::Touch {
                paths: owned(&args),
            },
            ("write", [path, text @ ..]) => ShellCommand::Write {
                path: path.to_string(),
                text: text.join(" "),
            },
            ("cat", [path]) => ShellCommand::Cat {
                path: path.to_string(),
            },
            ("rm", [path]) => ShellCommand::Rm {
                path: path.to_string(),
            },
            ("mv", [path, destination]) => ShellCommand::Mv {
                path: path.to_string(),
                destination: destination.to_string(),
            },
            ("cp", [path, destination]) => ShellCommand::Cp {
                path: path.to_string(),
                destination: destination.to_string(),
            },
            ("rename", [path, name]) => ShellCommand::Rename {
                path: path.to_string(),
                name: name.to_string(),
            },
            ("echo", text) => ShellCommand::Echo {
                text: text.join(" "),
            },
            (
                "pwd" | "ls" | "cd" | "mkdir" | "touch" | "write" | "cat" | "rm" | "mv" | "cp"
                | "rename",
                _,
            ) => {
                return Err(CommandParseError::Usage {
                    command: name.to_string(),
                    usage: usage(name),
                });
            }
            _ => {
                return Err(CommandParseError::UnknownCommand {
                    command: name.to_string(),
                });
            }
        };

        Ok(command)
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn usage(command: &str) -> &'static str {
    match command {
        "pwd" => "pwd",
        "ls" => "ls [path]",
        "cd" => "cd [path]",
        "mkdir" => "mkdir <path>...",
        "touch" => "touch <path>...",
        "write" => "write <path> <text>...",
        "cat" => "cat <path>",
        "rm" => "rm <path>",
        "mv" => "mv <path> <directory>",
        "cp" => "cp <path> <directory>",
        "rename" => "rename <path> <name>",
        _ => "",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum CommandParseError {
    #[snafu(display("Empty command"))]
    Empty,
    #[snafu(display("Unknown command '{}'", command))]
    UnknownCommand { command: String },
    #[snafu(display("Usage: {}", usage))]
    Usage {
        command: String,
        usage: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("pwd", ShellCommand::Pwd)]
    #[case("ls", ShellCommand::Ls { path: None })]
    #[case("ls /docs", ShellCommand::Ls { path: Some("/docs".into()) })]
    #[case("cd ..", ShellCommand::Cd { path: Some("..".into()) })]
    #[case("mkdir a b", ShellCommand::Mkdir { paths: vec!["a".into(), "b".into()] })]
    #[case("touch docs/a.txt", ShellCommand::Touch { paths: vec!["docs/a.txt".into()] })]
    #[case("write a.txt hello   world", ShellCommand::Write { path: "a.txt".into(), text: "hello world".into() })]
    #[case("write a.txt", ShellCommand::Write { path: "a.txt".into(), text: "".into() })]
    #[case("  cat a.txt  ", ShellCommand::Cat { path: "a.txt".into() })]
    #[case("rm a.txt", ShellCommand::Rm { path: "a.txt".into() })]
    #[case("mv a.txt /docs", ShellCommand::Mv { path: "a.txt".into(), destination: "/docs".into() })]
    #[case("cp a.txt /docs", ShellCommand::Cp { path: "a.txt".into(), destination: "/docs".into() })]
    #[case("rename a.txt b.txt", ShellCommand::Rename { path: "a.txt".into(), name: "b.txt".into() })]
    #[case("echo", ShellCommand::Echo { text: "".into() })]
    #[case("echo hi there", ShellCommand::Echo { text: "hi there".into() })]
    fn parses_commands(#[case] line: &str, #[case] expected: ShellCommand) {
        assert_eq!(ShellCommand::try_from(line), Ok(expected));
    }

    #[rstest]
    #[case("pwd extra")]
    #[case("ls a b")]
    #[case("mkdir")]
    #[case("cat")]
    #[case("mv only-one")]
    #[case("rename a")]
    fn reports_usage_on_wrong_arity(#[case] line: &str) {
        assert!(matches!(
            ShellCommand::try_from(line),
            Err(CommandParseError::Usage { .. })
        ));
    }

    #[test]
    fn rejects_unknown_and_empty_lines() {
        assert_eq!(
            ShellCommand::try_from("format c:"),
            Err(CommandParseError::UnknownCommand {
                command: "format".to_string()
            })
        );
        assert_eq!(ShellCommand::try_from("   "), Err(CommandParseError::Empty));
    }
}
