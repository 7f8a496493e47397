use std::fmt;

/// The two speakers tracked in a parent/child interview transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    Parent,
    Child,
}

impl Speaker {
    pub const ALL: [Speaker; 2] = [Speaker::Parent, Speaker::Child];

    /// Lower-cased 5-character tag that opens a speaker turn
    pub fn tag(self) -> &'static str {
        match self {
            Speaker::Parent => "paren",
            Speaker::Child => "child",
        }
    }

    /// Column prefix used in the results table
    pub fn prefix(self) -> &'static str {
        match self {
            Speaker::Parent => "P",
            Speaker::Child => "C",
        }
    }

    /// Match a lower-cased tag back to its speaker
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }

    pub fn transcript_column(self) -> String {
        format!("{}_transcript", self.prefix())
    }

    pub fn word_count_column(self) -> String {
        format!("{}_WordCount", self.prefix())
    }

    /// Name of the derived keyword column for `query`
    pub fn keyword_column(self, query: &str) -> String {
        format!("{}_{}", self.prefix(), query)
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Parent => write!(f, "parent"),
            Speaker::Child => write!(f, "child"),
        }
    }
}
