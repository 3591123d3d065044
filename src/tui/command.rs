// ABOUTME: Slash-command parser for the input box.
// ABOUTME: Plain text becomes a prompt for the selected agent; `/name args` becomes a Command.

use thiserror::Error;

use crate::tui::state::AgentRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    Agents,
    /// Create an agent keyed by the hash derived from the connected account.
    Create { prompt: String },
    /// Create an agent under an explicit NFT hash.
    CreateWithHash { nft_hash: String, prompt: String },
    Use(AgentRef),
    /// Select a blend agent by 1-based position.
    UseBlend(usize),
    History(HistoryPage),
    Blend { prompt: String },
    Run { prompt: String },
    Help,
    Quit,
}

/// Which history page `/history` asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPage {
    /// Refetch and show the first page.
    First,
    /// 1-based page number.
    Page(usize),
    Next,
    Prev,
}

/// What a submitted line means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Prompt(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command /{0}; try /help")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP_TEXT: &str = "\
/connect                      connect the wallet
/disconnect                   forget the connected account
/agents                       list your agents
/create <prompt>              create an agent for this wallet
/create-hash <hash> <prompt>  create an agent under an explicit hash
/use <n|hash>                 select an agent (an exact hash match wins over a position)
/use-blend <n>                select the blend agent /run talks to
/history [page|next|prev]     show conversation history
/blend <prompt>               create a team of web3 agents
/run <prompt>                 run the selected blend agent
/help                         show this help
/quit                         exit
Plain text is sent to the selected agent.";

/// Parse one submitted line.
pub fn parse_submission(line: &str) -> Result<Submission, CommandError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Submission::Prompt(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect,
        "disconnect" => Command::Disconnect,
        "agents" => Command::Agents,
        "create" => Command::Create {
            prompt: required(args, "/create <prompt>")?,
        },
        "create-hash" => {
            let (nft_hash, prompt) = args
                .split_once(char::is_whitespace)
                .map(|(hash, prompt)| (hash.to_string(), prompt.trim().to_string()))
                .filter(|(_, prompt)| !prompt.is_empty())
                .ok_or(CommandError::Usage("/create-hash <nft_hash> <prompt>"))?;
            Command::CreateWithHash { nft_hash, prompt }
        }
        "use" => {
            let target = required(args, "/use <n|nft_hash>")?;
            if target.bytes().all(|b| b.is_ascii_digit()) {
                Command::Use(AgentRef::Numeric(target))
            } else {
                Command::Use(AgentRef::Hash(target))
            }
        }
        "use-blend" => {
            let n = args
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(CommandError::Usage("/use-blend <n>"))?;
            Command::UseBlend(n)
        }
        "history" => Command::History(match args.to_ascii_lowercase().as_str() {
            "" => HistoryPage::First,
            "next" => HistoryPage::Next,
            "prev" => HistoryPage::Prev,
            page => HistoryPage::Page(
                page.parse::<usize>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or(CommandError::Usage("/history [page|next|prev]"))?,
            ),
        }),
        "blend" => Command::Blend {
            prompt: required(args, "/blend <prompt>")?,
        },
        "run" => Command::Run {
            prompt: required(args, "/run <prompt>")?,
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Submission::Command(command))
}

fn required(args: &str, usage: &'static str) -> Result<String, CommandError> {
    if args.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(args.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_submission(line).unwrap() {
            Submission::Command(c) => c,
            Submission::Prompt(p) => panic!("expected command, got prompt {p:?}"),
        }
    }

    #[test]
    fn plain_text_is_a_prompt() {
        assert_eq!(
            parse_submission("  what is my balance?  ").unwrap(),
            Submission::Prompt("what is my balance?".to_string())
        );
    }

    #[test]
    fn bare_commands() {
        assert_eq!(command("/connect"), Command::Connect);
        assert_eq!(command("/disconnect"), Command::Disconnect);
        assert_eq!(command("/agents"), Command::Agents);
        assert_eq!(command("/help"), Command::Help);
        assert_eq!(command("/QUIT"), Command::Quit);
        assert_eq!(command("/exit"), Command::Quit);
    }

    #[test]
    fn create_takes_rest_of_line() {
        assert_eq!(
            command("/create a  trading bot"),
            Command::Create {
                prompt: "a  trading bot".to_string()
            }
        );
        assert_eq!(
            parse_submission("/create"),
            Err(CommandError::Usage("/create <prompt>"))
        );
    }

    #[test]
    fn create_hash_needs_hash_and_prompt() {
        assert_eq!(
            command("/create-hash abc123 be helpful"),
            Command::CreateWithHash {
                nft_hash: "abc123".to_string(),
                prompt: "be helpful".to_string()
            }
        );
        assert!(matches!(
            parse_submission("/create-hash abc123"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn use_accepts_index_or_hash() {
        assert_eq!(
            command("/use 2"),
            Command::Use(AgentRef::Numeric("2".to_string()))
        );
        assert_eq!(
            command("/use 0042"),
            Command::Use(AgentRef::Numeric("0042".to_string()))
        );
        assert_eq!(
            command("/use 0a1b2c"),
            Command::Use(AgentRef::Hash("0a1b2c".to_string()))
        );
        assert!(parse_submission("/use").is_err());
    }

    #[test]
    fn use_blend_takes_positive_index() {
        assert_eq!(command("/use-blend 2"), Command::UseBlend(2));
        assert_eq!(
            parse_submission("/use-blend 0"),
            Err(CommandError::Usage("/use-blend <n>"))
        );
        assert!(parse_submission("/use-blend").is_err());
        assert!(parse_submission("/use-blend swapper").is_err());
    }

    #[test]
    fn history_accepts_page_or_direction() {
        assert_eq!(command("/history"), Command::History(HistoryPage::First));
        assert_eq!(command("/history 3"), Command::History(HistoryPage::Page(3)));
        assert_eq!(command("/history next"), Command::History(HistoryPage::Next));
        assert_eq!(command("/history PREV"), Command::History(HistoryPage::Prev));
        assert!(parse_submission("/history 0").is_err());
        assert!(parse_submission("/history later").is_err());
    }

    #[test]
    fn blend_and_run() {
        assert_eq!(
            command("/blend build a dex team"),
            Command::Blend {
                prompt: "build a dex team".to_string()
            }
        );
        assert_eq!(
            command("/run check balance"),
            Command::Run {
                prompt: "check balance".to_string()
            }
        );
    }

    #[test]
    fn unknown_command_errors() {
        let err = parse_submission("/frobnicate now").unwrap_err();
        assert_eq!(err, CommandError::Unknown("frobnicate".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
