use anyhow::Context;
use palaver_client::{
    api::{CommentId, ReplyId},
    Client, CommentTree, Config, HttpRemote, Intent, IntentError, Level, Notification, Notifier,
    SubmitError,
};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Base url of the store, defaults to PALAVER_HOST or http://localhost:8000
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List comments, best first
    List,

    /// Show who the store thinks we are
    Whoami,

    /// Post a new comment
    Post { content: String },

    /// Reply to a comment, or to one of its replies
    Reply {
        comment: CommentId,

        /// Reply being answered, if not the comment itself
        #[structopt(long)]
        to: Option<ReplyId>,

        content: String,
    },

    /// Edit one of our comments or replies
    Edit {
        comment: CommentId,

        #[structopt(long)]
        reply: Option<ReplyId>,

        content: String,
    },

    /// Delete one of our comments or replies
    Delete {
        comment: CommentId,

        #[structopt(long)]
        reply: Option<ReplyId>,
    },

    Upvote {
        comment: CommentId,

        #[structopt(long)]
        reply: Option<ReplyId>,
    },

    Downvote {
        comment: CommentId,

        #[structopt(long)]
        reply: Option<ReplyId>,
    },
}

impl Command {
    fn intent(self) -> Option<Intent> {
        Some(match self {
            Command::List | Command::Whoami => return None,
            Command::Post { content } => Intent::AddComment { content },
            Command::Reply {
                comment,
                to: None,
                content,
            } => Intent::AddReply { comment, content },
            Command::Reply {
                comment,
                to: Some(reply),
                content,
            } => Intent::AddNestedReply {
                comment,
                reply,
                content,
            },
            Command::Edit {
                comment,
                reply: None,
                content,
            } => Intent::EditComment { comment, content },
            Command::Edit {
                comment,
                reply: Some(reply),
                content,
            } => Intent::EditReply {
                comment,
                reply,
                content,
            },
            Command::Delete {
                comment,
                reply: None,
            } => Intent::DeleteComment { comment },
            Command::Delete {
                comment,
                reply: Some(reply),
            } => Intent::DeleteReply { comment, reply },
            Command::Upvote {
                comment,
                reply: None,
            } => Intent::UpvoteComment { comment },
            Command::Upvote {
                comment,
                reply: Some(reply),
            } => Intent::UpvoteReply { comment, reply },
            Command::Downvote {
                comment,
                reply: None,
            } => Intent::DownvoteComment { comment },
            Command::Downvote {
                comment,
                reply: Some(reply),
            } => Intent::DownvoteReply { comment, reply },
        })
    }
}

struct PrintNotifier;

impl Notifier for PrintNotifier {
    fn notify(&self, n: Notification) {
        match n.level {
            Level::Success => println!("{}", n.message),
            Level::Failure => eprintln!("{}", n.message),
        }
    }
}

fn print_tree(tree: &CommentTree) {
    for c in tree {
        println!(
            "#{} [{}] {} ({}): {}",
            c.id,
            c.score,
            c.user.username,
            c.created_at.as_str(),
            c.content
        );
        for r in &c.replies {
            println!(
                "    {} [{}] {} ({}): @{} {}",
                r.id,
                r.score,
                r.user.username,
                r.created_at.as_str(),
                r.replying_to,
                r.content
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();

    let mut config = Config::from_env().context("reading configuration from environment")?;
    if let Some(host) = opt.host {
        config.host = host;
    }
    let client = Client::with_notifier(HttpRemote::new(config.host.clone()), &config, PrintNotifier);

    match opt.cmd {
        Command::List => {
            let tree = client.comments().await.context("fetching comments")?;
            print_tree(&tree);
        }
        Command::Whoami => {
            let user = client.current_user().await.context("fetching current user")?;
            println!("{}", user.username);
        }
        cmd => {
            let session = client.session().await.context("fetching current user")?;
            if let Some(intent) = cmd.intent() {
                let kind = intent.kind();
                match client.submit(&session, intent).await {
                    Err(SubmitError::Rejected(IntentError::InvalidContent(e))) => {
                        anyhow::bail!("{}", e.message(kind.subject()))
                    }
                    res => res?,
                }
            }
        }
    }

    Ok(())
}
