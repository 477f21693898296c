use std::{error::Error, fmt, iter};

/// An error followed by each of its sources, outermost first.
pub fn error_chain<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    iter::successors(Some(err), |&current: &&'a (dyn Error + 'static)| current.source())
}

/// Prints an error and then one indented line per cause.
///
/// A cause whose message is the same as the line above it is left out, which
/// happens with errors that forward their source's message.
pub struct ErrorDisplay<'a>(pub &'a (dyn Error + 'static));

impl fmt::Display for ErrorDisplay<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let mut previous: Option<String> = None;

        for (depth, err) in error_chain(self.0).enumerate() {
            let message = err.to_string();
            if previous.as_deref() == Some(message.as_str()) {
                continue;
            }

            if depth == 0 {
                write!(formatter, "{}", message)?;
            } else {
                write!(formatter, "\n  caused by: {}", message)?;
            }

            previous = Some(message);
        }

        Ok(())
    }
}
