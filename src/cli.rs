use crate::{ConvertOptions, DEFAULT_INDENT, Result, XmlTreeConverter, XmlTreeError};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::fs;
use tracing::error;

pub struct Cli;

impl Cli {
    pub fn build_command() -> Command {
        Command::new("xmltree2xml")
            .about("Converts aapt xmltree dumps of compiled Android XML to classic XML")
            .long_about("Converts the output of 'aapt dump xmltree' back into readable XML.\n\nEach input file is converted independently into the output directory. An input of '-' is read from stdin and written to stdout.")
            .arg(
                Arg::new("no-header")
                    .short('n')
                    .long("no-header")
                    .help("Do not add an xml header")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("resources")
                    .short('r')
                    .long("resources")
                    .value_name("FILE")
                    .help("'aapt dump resources' output used to replace hex references with resource names"),
            )
            .arg(
                Arg::new("output-dir")
                    .short('o')
                    .long("output-dir")
                    .value_name("DIR")
                    .default_value("output")
                    .help("Output directory"),
            )
            .arg(
                Arg::new("rename-file")
                    .short('f')
                    .long("rename-file")
                    .help("Rename output files with their resource name")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("indent")
                    .long("indent")
                    .value_name("N")
                    .default_value("4")
                    .value_parser(value_parser!(usize))
                    .help("Spaces per nesting level"),
            )
            .arg(
                Arg::new("check")
                    .long("check")
                    .help("Fail when the produced XML is not well-formed")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("file")
                    .help("xmltree dump file (use '-' for stdin)")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            )
    }

    pub fn run() -> Result<()> {
        let matches = Self::build_command().get_matches();
        Self::run_with_matches(matches)
    }

    pub fn run_with_matches(matches: ArgMatches) -> Result<()> {
        let files: Vec<&String> = matches
            .get_many::<String>("file")
            .map(|files| files.collect())
            .unwrap_or_default();
        let output_dir = matches
            .get_one::<String>("output-dir")
            .cloned()
            .unwrap_or_else(|| "output".to_string());
        let options = ConvertOptions {
            header: !matches.get_flag("no-header"),
            indent: matches
                .get_one::<usize>("indent")
                .copied()
                .unwrap_or(DEFAULT_INDENT),
            rename: matches.get_flag("rename-file"),
            check: matches.get_flag("check"),
        };

        if files.iter().filter(|file| file.as_str() == "-").count() > 1 {
            return Err(XmlTreeError::InvalidArgument(
                "stdin ('-') can only be given once".to_string(),
            ));
        }

        let resources = match matches.get_one::<String>("resources") {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| XmlTreeError::from(e).in_file(path))?),
            None => None,
        };
        let resources = resources.as_deref();

        let total = files.len();
        let mut failed = 0;
        for file in files {
            let result = if file == "-" {
                XmlTreeConverter::convert_stdin_stdout(resources, &options)
                    .map_err(|e| e.in_file("<stdin>"))
            } else {
                XmlTreeConverter::convert_file(file, &output_dir, resources, &options).map(|_| ())
            };

            if let Err(e) = result {
                error!("{}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(XmlTreeError::BatchFailed { failed, total });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_command() {
        let cmd = Cli::build_command();
        assert_eq!(cmd.get_name(), "xmltree2xml");
    }

    #[test]
    fn test_requires_file() {
        let result = Cli::build_command().try_get_matches_from(vec!["xmltree2xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let matches = Cli::build_command()
            .try_get_matches_from(vec!["xmltree2xml", "a", "b"])
            .unwrap();
        assert_eq!(matches.get_many::<String>("file").unwrap().count(), 2);
        assert_eq!(matches.get_one::<String>("output-dir").unwrap(), "output");
        assert_eq!(*matches.get_one::<usize>("indent").unwrap(), 4);
        assert!(!matches.get_flag("no-header"));
        assert!(!matches.get_flag("rename-file"));
    }

    #[test]
    fn test_stdin_twice_error() {
        let matches = Cli::build_command()
            .try_get_matches_from(vec!["xmltree2xml", "-", "-"])
            .unwrap();

        let result = Cli::run_with_matches(matches);
        if let Err(XmlTreeError::InvalidArgument(msg)) = result {
            assert!(msg.contains("only be given once"));
        } else {
            panic!("Expected InvalidArgument");
        }
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good");
        let bad = dir.path().join("bad");
        fs::write(&good, "E: tag (line=1)\n").unwrap();
        fs::write(&bad, "E: a (line=1)\nE: b (line=2)\n").unwrap();
        let out = dir.path().join("out");

        let matches = Cli::build_command()
            .try_get_matches_from(vec![
                "xmltree2xml".to_string(),
                "-n".to_string(),
                "-o".to_string(),
                out.display().to_string(),
                bad.display().to_string(),
                good.display().to_string(),
            ])
            .unwrap();

        let result = Cli::run_with_matches(matches);
        assert!(matches!(
            result,
            Err(XmlTreeError::BatchFailed { failed: 1, total: 2 })
        ));
        assert_eq!(fs::read_to_string(out.join("good.xml")).unwrap(), "<tag />");
        assert!(!out.join("bad.xml").exists());
    }
}
