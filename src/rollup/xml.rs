//! Graphite rollup rules in XML form.
//!
//! ```xml
//! <yandex>
//!   <graphite_rollup>
//!     <pattern>
//!       <regexp>^carbon\.</regexp>
//!       <function>max</function>
//!       <retention><age>0</age><precision>60</precision></retention>
//!     </pattern>
//!     <default>
//!       <function>avg</function>
//!       <retention><age>0</age><precision>60</precision></retention>
//!       <retention><age>86400</age><precision>3600</precision></retention>
//!     </default>
//!   </graphite_rollup>
//! </yandex>
//! ```
//!
//! The root element name is not checked.

use serde::Deserialize;
use thiserror::Error;

use crate::rollup::{Pattern, Rollup, RollupParser, RollupParserError};

#[derive(Debug, Error)]
pub enum RollupXmlError {
    #[error("rules are not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed rules: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("missing <graphite_rollup> section")]
    MissingSection,

    #[error("<default> has no <function>")]
    MissingDefaultFunction,

    #[error("zero precision in {0}")]
    ZeroPrecision(String),
}

#[derive(Deserialize)]
struct Document {
    graphite_rollup: Option<Rollup>,
}

/// Parses the Graphite `graphite_rollup` XML section.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollupXmlParser;

impl RollupXmlParser {
    pub fn parse_str(&self, text: &str) -> Result<Rollup, RollupXmlError> {
        let document: Document = quick_xml::de::from_str(text)?;
        let mut rollup = document
            .graphite_rollup
            .ok_or(RollupXmlError::MissingSection)?;

        if rollup.default.function.is_none() {
            return Err(RollupXmlError::MissingDefaultFunction);
        }

        for (index, pattern) in rollup.patterns.iter_mut().enumerate() {
            compile(pattern, || format!("pattern #{}", index + 1))?;
        }
        compile(&mut rollup.default, || "default".to_string())?;

        Ok(rollup)
    }
}

fn compile(pattern: &mut Pattern, name: impl Fn() -> String) -> Result<(), RollupXmlError> {
    if pattern.retention.iter().any(|r| r.precision == 0) {
        return Err(RollupXmlError::ZeroPrecision(name()));
    }
    pattern.retention.sort_by_key(|r| r.age);
    Ok(())
}

impl RollupParser for RollupXmlParser {
    fn parse(&self, body: &[u8]) -> Result<Rollup, RollupParserError> {
        let text = std::str::from_utf8(body).map_err(RollupXmlError::from)?;
        Ok(self.parse_str(text)?)
    }
}
