use crate::{DEFAULT_INDENT, Result, XML_HEADER, XmlTreeError, parse, resolve_output_name};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Output settings for a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Write the `<?xml ...?>` declaration first.
    pub header: bool,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Name output files after their `xml/<name>` resource entry.
    pub rename: bool,
    /// Re-read the produced XML and reject it if it is not well-formed.
    pub check: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            header: true,
            indent: DEFAULT_INDENT,
            rename: false,
            check: false,
        }
    }
}

/// High-level converter for xmltree dump to XML conversion
pub struct XmlTreeConverter;

impl XmlTreeConverter {
    /// Convert a dump held in memory to XML text
    ///
    /// # Examples
    ///
    /// ```
    /// use xmltree2xml::{ConvertOptions, XmlTreeConverter};
    ///
    /// let xml = XmlTreeConverter::convert_str("E: tag (line=1)", None, &ConvertOptions::default()).unwrap();
    /// assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<tag />");
    /// ```
    pub fn convert_str(
        dump: &str,
        resources: Option<&str>,
        options: &ConvertOptions,
    ) -> Result<String> {
        let tree = parse(dump, resources)?;
        let body = tree.to_xml(options.indent);

        if options.check {
            Self::check_well_formed(&body)?;
        }

        if options.header {
            Ok(format!("{XML_HEADER}{body}"))
        } else {
            Ok(body)
        }
    }

    /// Convert a dump from a reader to a writer
    ///
    /// The whole input is read before parsing starts.
    pub fn convert<R: Read, W: Write>(
        mut reader: R,
        mut writer: W,
        resources: Option<&str>,
        options: &ConvertOptions,
    ) -> Result<()> {
        let mut dump = String::new();
        reader.read_to_string(&mut dump)?;
        let xml = Self::convert_str(&dump, resources, options)?;
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Convert a dump file into `output_dir`, returning the written path
    ///
    /// The output directory is created when missing. Errors are tagged with
    /// the input file name.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use xmltree2xml::{ConvertOptions, XmlTreeConverter};
    ///
    /// let path = XmlTreeConverter::convert_file("AndroidManifest", "output", None, &ConvertOptions::default()).unwrap();
    /// assert_eq!(path.to_str(), Some("output/AndroidManifest.xml"));
    /// ```
    pub fn convert_file(
        input_path: &str,
        output_dir: &str,
        resources: Option<&str>,
        options: &ConvertOptions,
    ) -> Result<PathBuf> {
        Self::convert_file_inner(input_path, output_dir, resources, options)
            .map_err(|e| e.in_file(input_path))
    }

    fn convert_file_inner(
        input_path: &str,
        output_dir: &str,
        resources: Option<&str>,
        options: &ConvertOptions,
    ) -> Result<PathBuf> {
        let input_file = File::open(input_path)?;
        let reader = BufReader::new(input_file);

        let rename_with = if options.rename { resources } else { None };
        let output_path = Self::output_path(output_dir, input_path, rename_with);
        fs::create_dir_all(output_dir)?;

        // Convert fully before creating the output so a failure leaves no partial file.
        let mut output_data = Vec::new();
        Self::convert(reader, &mut output_data, resources, options)?;

        let output_file = File::create(&output_path)?;
        let mut writer = BufWriter::new(output_file);
        writer.write_all(&output_data)?;
        writer.flush()?;

        info!("writing '{}' ...", output_path.display());
        Ok(output_path)
    }

    /// Convert a dump from stdin to stdout
    pub fn convert_stdin_stdout(resources: Option<&str>, options: &ConvertOptions) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let writer = BufWriter::new(stdout.lock());

        Self::convert(stdin.lock(), writer, resources, options)
    }

    /// Path of the XML file produced for `input_path` inside `output_dir`
    pub fn output_path(output_dir: &str, input_path: &str, resources: Option<&str>) -> PathBuf {
        Path::new(output_dir).join(resolve_output_name(input_path, resources))
    }

    /// Fails when `xml` is not a well-formed document
    pub fn check_well_formed(xml: &str) -> Result<()> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => return Ok(()),
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    for attr in e.attributes() {
                        attr.map_err(|err| XmlTreeError::MalformedOutput(err.to_string()))?;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    return Err(XmlTreeError::MalformedOutput(format!(
                        "{} at position {}",
                        err,
                        reader.error_position()
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn no_header() -> ConvertOptions {
        ConvertOptions {
            header: false,
            ..ConvertOptions::default()
        }
    }

    #[test]
    fn test_convert_str_with_header() {
        let xml = XmlTreeConverter::convert_str("E: tag (line=1)", None, &ConvertOptions::default())
            .unwrap();
        assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<tag />");
    }

    #[test]
    fn test_convert_str_indent() {
        let dump = "E: a (line=1)\n    E: b (line=2)";
        let options = ConvertOptions {
            indent: 2,
            ..no_header()
        };
        let xml = XmlTreeConverter::convert_str(dump, None, &options).unwrap();
        assert_eq!(xml, "<a>\n  <b />\n</a>");
    }

    #[test]
    fn test_convert_reader_writer() {
        let input = Cursor::new("E: tag (line=1)\n    T: hi\n");
        let mut output = Vec::new();
        XmlTreeConverter::convert(input, &mut output, None, &no_header()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "<tag>hi</tag>");
    }

    #[test]
    fn test_output_path() {
        let path = XmlTreeConverter::output_path("out", "dumps/layout", None);
        assert_eq!(path, Path::new("out").join("layout.xml"));
    }

    #[test]
    fn test_check_well_formed() {
        assert!(XmlTreeConverter::check_well_formed("<a>\n    <b x=\"1\" />\n</a>").is_ok());
        assert!(matches!(
            XmlTreeConverter::check_well_formed("<a><b></a>"),
            Err(XmlTreeError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_check_option_rejects_unescaped_output() {
        let dump = "E: a (line=1)\n  A: x=\"1\"2\"";
        let options = ConvertOptions {
            check: true,
            ..no_header()
        };
        let result = XmlTreeConverter::convert_str(dump, None, &options);
        assert!(matches!(result, Err(XmlTreeError::MalformedOutput(_))));
    }
}
