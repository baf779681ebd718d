use std::fmt::{self, Display};

/// A rich attachment to a chat message.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Embed {
    /// Where the image to display is hosted.
    pub image: String,
    /// Annotation displayed below the image.
    pub footer: Option<String>,
    /// Instructions displayed next to the image.
    pub hint: String,
}

/// What a chat message displays.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct View {
    /// The text of the message.
    pub content: String,
    /// An optional attachment.
    pub embed: Option<Embed>,
}

impl View {
    /// A plain text view.
    pub fn text<T: Into<String>>(content: T) -> Self {
        View {
            content: content.into(),
            embed: None,
        }
    }

    /// This view without its attachment.
    pub fn plain(self) -> Self {
        View::text(self.content)
    }
}

impl Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)?;

        if let Some(embed) = &self.embed {
            write!(f, "\n  | {}", embed.image)?;

            for line in embed.hint.lines() {
                write!(f, "\n  | {line}")?;
            }

            if let Some(footer) = &embed.footer {
                write!(f, "\n  | {footer}")?;
            }
        }

        Ok(())
    }
}
