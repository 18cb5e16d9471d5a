//! Competency-code identifiers and the KSA category taxonomy.

/// KSA category, keyed by the leading letter of a competency code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	Knowledge,
	Skills,
	Attitudes,
}

impl Category {
	/// All categories in canonical K, S, A order.
	pub const ALL: [Category; 3] = [Category::Knowledge, Category::Skills, Category::Attitudes];

	pub fn from_letter(letter: char) -> Option<Category> {
		match letter {
			'K' => Some(Category::Knowledge),
			'S' => Some(Category::Skills),
			'A' => Some(Category::Attitudes),
			_ => None,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Category::Knowledge => "Knowledge",
			Category::Skills => "Skills",
			Category::Attitudes => "Attitudes",
		}
	}

	pub fn key(self) -> &'static str {
		match self {
			Category::Knowledge => "knowledge",
			Category::Skills => "skills",
			Category::Attitudes => "attitudes",
		}
	}
}

/// A parsed competency code: `K1` is a root, `K1.2` a subcode whose root
/// is `K1`. Anything that doesn't match either shape fails to parse and is
/// ignored by callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompetencyCode {
	Root { category: Category, code: String },
	Sub { category: Category, root: String, code: String },
}

impl CompetencyCode {
	pub fn parse(raw: &str) -> Option<CompetencyCode> {
		let mut chars = raw.chars();
		let letter = chars.next()?;
		let category = Category::from_letter(letter)?;
		let rest = &raw[letter.len_utf8()..];

		match rest.split_once('.') {
			None => {
				if !is_digits(rest) {
					return None;
				}
				Some(CompetencyCode::Root {
					category,
					code: raw.to_string(),
				})
			}
			Some((major, minor)) => {
				if !is_digits(major) || !is_digits(minor) {
					return None;
				}
				Some(CompetencyCode::Sub {
					category,
					root: format!("{letter}{major}"),
					code: raw.to_string(),
				})
			}
		}
	}

	pub fn category(&self) -> Category {
		match self {
			CompetencyCode::Root { category, .. } | CompetencyCode::Sub { category, .. } => *category,
		}
	}

	pub fn code(&self) -> &str {
		match self {
			CompetencyCode::Root { code, .. } | CompetencyCode::Sub { code, .. } => code,
		}
	}
}

fn is_digits(s: &str) -> bool {
	!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_root_codes() {
		assert_eq!(
			CompetencyCode::parse("K1"),
			Some(CompetencyCode::Root {
				category: Category::Knowledge,
				code: "K1".to_string(),
			})
		);
		assert_eq!(
			CompetencyCode::parse("A12"),
			Some(CompetencyCode::Root {
				category: Category::Attitudes,
				code: "A12".to_string(),
			})
		);
	}

	#[test]
	fn parses_subcodes_with_their_root() {
		let parsed = CompetencyCode::parse("S2.3").unwrap();
		assert_eq!(
			parsed,
			CompetencyCode::Sub {
				category: Category::Skills,
				root: "S2".to_string(),
				code: "S2.3".to_string(),
			}
		);
		assert_eq!(parsed.category(), Category::Skills);
		assert_eq!(parsed.code(), "S2.3");
	}

	#[test]
	fn rejects_malformed_codes() {
		for raw in ["", "K", "X1", "K.", "K1.", "K.2", "K1.2.3", "k1", "K1a", "K 1"] {
			assert_eq!(CompetencyCode::parse(raw), None, "should reject {raw:?}");
		}
	}
}
