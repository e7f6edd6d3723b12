/*!
Error types used in the library.

Most of these are very unlikely to occur during use --- the search itself is a
deterministic monotone refinement with no failure modes of its own, so errors
are confined to building a problem, configuration, and the file system.

Names of the error enums overlap with corresponding structs; throughout the
library `err::{self}` is used to prefix uses with `err::`.
*/

/// A union of varied error kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// An error while parsing a grounded problem.
    Parse(ParseError),

    /// An error while assembling a problem.
    Build(BuildError),

    /// An unsupported combination of configuration switches.
    Config(ConfigError),

    /// An error from the file system, by kind.
    Io(std::io::ErrorKind),
}

/// Errors while parsing the grounded STRIPS format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Some issue with the problem specification line (`p strips N A`).
    ProblemSpecification,

    /// The problem specification did not precede the records which need it.
    MisplacedProblem(usize),

    /// Some unspecific problem at a specific line.
    Line(usize),

    /// An atom outside the declared fact universe.
    AtomOutOfRange(usize),

    /// A required `0` terminator was not found.
    MissingTerminator(usize),

    /// Fewer records than the specification promised.
    Incomplete,
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors while assembling a problem.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// The fact universe is empty.
    NoAtoms,

    /// The goal condition is empty.
    EmptyGoal,
}

impl From<BuildError> for ErrorKind {
    fn from(e: BuildError) -> Self {
        ErrorKind::Build(e)
    }
}

/// Unsupported combinations of configuration switches.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// Sidestepping (`resched == 2`) requires stack-ordered obligations.
    SidestepNeedsStack,

    /// Obligation survival requires obligation subsumption, otherwise a
    /// surviving obligation may reach a layer with no false clause.
    SurvivalNeedsSubsumption,
}

impl From<ConfigError> for ErrorKind {
    fn from(e: ConfigError) -> Self {
        ErrorKind::Config(e)
    }
}

impl From<std::io::Error> for ErrorKind {
    fn from(e: std::io::Error) -> Self {
        ErrorKind::Io(e.kind())
    }
}
