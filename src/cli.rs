//! CLI argument parsing for restyle.
//!
//! Uses clap derive macros. The tool has a single purpose, so the parser is
//! flat: two positional branch names and a verbosity switch.

use clap::Parser;

/// Rebase and restyle a Git branch across a code-style migration point.
///
/// The branch to rewrite is rebased onto the commit preceding the target
/// branch's style-switch commit, then each of its commits is replayed on top
/// of the switch commit with the touched source files reformatted. All work
/// happens in a disposable worktree; the primary checkout is never touched.
#[derive(Parser, Debug)]
#[command(name = "restyle")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit progress diagnostics to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Branch to rewrite.
    pub existing_branch: String,

    /// Branch containing the style-switch commit.
    pub target_branch: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
