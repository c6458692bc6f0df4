//! Accept/reject prompt capability.

use std::io;
use std::path::Path;

/// The operator's answer to a staged mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Replace the reference with the staged output.
    Accept,
    /// Keep the reference.
    Reject,
}

/// Asks an operator whether a staged output should replace its reference.
///
/// Only consulted in interactive sessions. Closures of the matching shape
/// implement this trait, which is how tests script decisions.
pub trait Prompt: Send + Sync {
    fn decide(&self, reference: &Path, staged: &Path) -> io::Result<Decision>;
}

impl<F> Prompt for F
where
    F: Fn(&Path, &Path) -> io::Result<Decision> + Send + Sync,
{
    fn decide(&self, reference: &Path, staged: &Path) -> io::Result<Decision> {
        self(reference, staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_prompt() {
        let prompt = |_: &Path, staged: &Path| {
            Ok::<_, io::Error>(if staged.ends_with("ok.txt") {
                Decision::Accept
            } else {
                Decision::Reject
            })
        };
        let boxed: Box<dyn Prompt> = Box::new(prompt);
        assert_eq!(
            boxed.decide(Path::new("/r/ok.txt"), Path::new("/s/ok.txt")).unwrap(),
            Decision::Accept
        );
        assert_eq!(
            boxed.decide(Path::new("/r/no.txt"), Path::new("/s/no.txt")).unwrap(),
            Decision::Reject
        );
    }
}
