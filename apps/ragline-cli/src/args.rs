use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ragline", version, about = "Retrieval-augmented question answering over local text files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Chunk and index .txt/.md files or directories
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Ask a question against the indexed documents
    Query {
        question: String,
        /// Documents to retrieve (defaults to `query.top_k`)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Log retrieval results and document previews
        #[arg(long)]
        debug: bool,
        /// Print the documents the answer was grounded on
        #[arg(long)]
        sources: bool,
    },
    /// List every indexed document
    List,
    /// Remove all documents from the collection
    Clear,
    /// Show service, model, and index settings
    Info,
}

impl Command {
    pub fn debug(&self) -> bool {
        matches!(self, Command::Query { debug: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_flags_parse() {
        let cli = Cli::parse_from(["ragline", "query", "What is RDF?", "-k", "5", "--debug", "--sources"]);
        match cli.command {
            Command::Query { question, top_k, debug, sources } => {
                assert_eq!(question, "What is RDF?");
                assert_eq!(top_k, Some(5));
                assert!(debug && sources);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_requires_a_path() {
        assert!(Cli::try_parse_from(["ragline", "add"]).is_err());
        let cli = Cli::parse_from(["ragline", "add", "notes.md", "docs"]);
        assert!(matches!(cli.command, Command::Add { ref paths } if paths.len() == 2));
        assert!(!cli.command.debug());
    }
}
