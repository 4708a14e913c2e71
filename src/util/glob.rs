use std::str::Chars;

/// Wildcard pattern as used in `known_hosts` host lists.
///
/// `?` matches exactly one character and `*` any (possibly empty) sequence. Matching works on
/// Unicode scalar values and is case-sensitive; callers fold case beforehand if needed.
///
/// The pattern is split at each `*`. The first and last segment are anchored to the start
/// and end of the input, the segments in between float over the rest in order. This is
/// linear for typical host patterns and quadratic at worst.
#[derive(Debug, Clone, Copy)]
pub struct Glob<'a>(pub &'a str);

impl<'a> Glob<'a> {
    const ONE: char = '?';
    const ANY: char = '*';

    pub fn matches(&self, input: &str) -> bool {
        let mut segments = self.0.split(Self::ANY);
        let mut rest = input.chars();
        match segments.next() {
            Some(head) if Self::eat(head, &mut rest, |x| x.next()) != Some(true) => return false,
            _ => (),
        }
        match segments.next_back() {
            // No `*` at all: the head must have consumed everything.
            None => return rest.next().is_none(),
            Some(tail) if Self::eat(tail, &mut rest, |x| x.next_back()) != Some(true) => {
                return false
            }
            _ => (),
        }
        for segment in segments {
            loop {
                match Self::eat(segment, &mut rest, |x| x.next()) {
                    Some(true) => break,
                    Some(false) => return false,
                    None => {
                        // Slide one character to the right and retry.
                        if rest.next().is_none() {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// Consume `segment` from one end of `input`.
    ///
    /// `Some(true)` on a match (input advanced), `None` on a mismatch and `Some(false)` when
    /// the input ran out first. The input is left untouched unless the segment matched.
    fn eat(
        segment: &str,
        input: &mut Chars,
        next: fn(&mut Chars) -> Option<char>,
    ) -> Option<bool> {
        let mut ahead = input.clone();
        let mut pattern = segment.chars();
        while let Some(p) = next(&mut pattern) {
            match next(&mut ahead) {
                Some(c) if c == p || p == Self::ONE => (),
                Some(_) => return None,
                None => return Some(false),
            }
        }
        *input = ahead;
        Some(true)
    }
}
