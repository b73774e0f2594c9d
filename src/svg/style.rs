use std::fmt;

/// An inline `style` attribute as an ordered list of raw `;`-separated segments.
///
/// Segments that are never touched keep their exact text, so parsing and printing
/// an unmodified style gives back the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    segments: Vec<String>,
}

fn split(segment: &str) -> Option<(String, &str)> {
    let (name, value) = segment.split_once(':')?;
    Some((name.trim().to_ascii_lowercase(), value.trim()))
}

impl Style {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self {
            segments: raw.split(';').map(str::to_string).collect(),
        }
    }

    /// Value of the last declaration of `property`.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .filter_map(|s| split(s))
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Set `property`, replacing an existing declaration in place.
    pub fn set(&mut self, property: &str, value: &str) {
        let declaration = format!("{property}:{value}");
        let mut positions = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| split(s).is_some_and(|(name, _)| name == property))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        if let Some(last) = positions.pop() {
            self.segments[last] = declaration;
            for i in positions.into_iter().rev() {
                self.segments.remove(i);
            }
            return;
        }

        // Keep a trailing `;` trailing.
        match self.segments.last() {
            Some(tail) if tail.trim().is_empty() && self.segments.len() > 1 => {
                let at = self.segments.len() - 1;
                self.segments.insert(at, declaration);
            }
            _ => self.segments.push(declaration),
        }
    }

    /// Drop every declaration of the given properties. Returns whether anything changed.
    pub fn remove(&mut self, properties: &[&str]) -> bool {
        let before = self.segments.len();
        self.segments
            .retain(|s| !split(s).is_some_and(|(name, _)| properties.contains(&name.as_str())));
        self.segments.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.trim().is_empty())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(";"))
    }
}
