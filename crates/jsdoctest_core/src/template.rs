//! Wrapper synthesis for sample code.
//!
//! A sample is never evaluated on its own. It is spliced into a single-parameter arrow function that
//! receives the `require` capability, binds the selected assertion library, and runs the sample in a
//! `try` block so a thrown error comes back as the function's return value.

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::error::CaseError;
use crate::options::Options;

/// Assertion library made available to sample code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertLibrary {
    /// `chai` with the `should` style enabled on `Object.prototype`
    Chai,
    /// `expect` from `chai`
    ChaiExpect,
    /// `assert` from `chai`
    ChaiAssert,
    /// The standalone `expect` package
    Expect,
    /// The `expect.js` package
    ExpectJs,
    /// The built-in `assert` module
    Node,
}

impl AssertLibrary {
    pub const ALL: [AssertLibrary; 6] = [
        AssertLibrary::Chai,
        AssertLibrary::ChaiExpect,
        AssertLibrary::ChaiAssert,
        AssertLibrary::Expect,
        AssertLibrary::ExpectJs,
        AssertLibrary::Node,
    ];

    pub fn selector(self) -> &'static str {
        match self {
            AssertLibrary::Chai => "chai",
            AssertLibrary::ChaiExpect => "chai-expect",
            AssertLibrary::ChaiAssert => "chai-assert",
            AssertLibrary::Expect => "expect",
            AssertLibrary::ExpectJs => "expect.js",
            AssertLibrary::Node => "node",
        }
    }

    /// The statement that binds the library inside the wrapper.
    pub fn preamble(self) -> &'static str {
        match self {
            AssertLibrary::Chai => "require('chai').should();",
            AssertLibrary::ChaiExpect => "const expect = require('chai').expect;",
            AssertLibrary::ChaiAssert => "const assert = require('chai').assert;",
            AssertLibrary::Expect => "const expect = require('expect');",
            AssertLibrary::ExpectJs => "const expect = require('expect.js');",
            AssertLibrary::Node => "const assert = require('assert');",
        }
    }

    /// Resolve the effective library for a sample: `options.assert` first, then `config.assert`.
    pub fn select(config: &Config, options: &Options) -> Result<Self, CaseError> {
        options.text("assert").unwrap_or(config.assert.as_str()).parse()
    }
}

impl FromStr for AssertLibrary {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssertLibrary::ALL
            .into_iter()
            .find(|lib| lib.selector() == s)
            .ok_or_else(|| CaseError::UnknownAssertion(s.to_string()))
    }
}

impl fmt::Display for AssertLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Build the executable wrapper source for `code`.
///
/// ## Errors
///
/// Returns [`CaseError::UnknownAssertion`] when the effective selector names no known library.
pub fn template(code: &str, config: &Config, options: &Options) -> Result<String, CaseError> {
    let library = AssertLibrary::select(config, options)?;

    Ok(format!(
        "(require) => {{\n    {preamble}\n\n    try {{\n        {code}\n    }} catch (error) {{\n        return error;\n    }}\n}};\n",
        preamble = library.preamble(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;

    #[test]
    fn test_node_template_shape() {
        let source = template("console.log(true);", &Config::default(), &Options::new()).unwrap();
        assert_eq!(
            source,
            "(require) => {\n    const assert = require('assert');\n\n    try {\n        console.log(true);\n    } catch (error) {\n        return error;\n    }\n};\n"
        );
    }

    #[test]
    fn test_options_override_config() {
        let config = Config::default().with_assert("chai");
        let options = Options::new().with("assert", OptionValue::Text("expect.js".to_string()));
        let source = template("x", &config, &options).unwrap();
        assert!(source.contains("const expect = require('expect.js');"));
        assert!(!source.contains("chai"));
    }

    #[test]
    fn test_empty_option_falls_back_to_config() {
        let config = Config::default().with_assert("chai-assert");
        let options = Options::parse("#assert=");
        let source = template("x", &config, &options).unwrap();
        assert!(source.contains("const assert = require('chai').assert;"));
    }

    #[test]
    fn test_expect_and_expect_js_are_distinct() {
        assert_eq!(AssertLibrary::Expect.preamble(), "const expect = require('expect');");
        assert_eq!(AssertLibrary::ExpectJs.preamble(), "const expect = require('expect.js');");
    }

    #[test]
    fn test_every_selector_parses_back() {
        for lib in AssertLibrary::ALL {
            assert_eq!(lib.selector().parse::<AssertLibrary>().unwrap(), lib);
        }
    }

    #[test]
    fn test_unknown_selector_is_rejected() {
        let options = Options::parse("#assert=nonsense");
        let err = template("x", &Config::default(), &options).unwrap_err();
        assert_eq!(err, CaseError::UnknownAssertion("nonsense".to_string()));
    }

    #[test]
    fn test_bare_assert_flag_is_unknown() {
        let options = Options::parse("#assert");
        let err = template("x", &Config::default(), &options).unwrap_err();
        assert_eq!(err, CaseError::UnknownAssertion("true".to_string()));
    }
}
