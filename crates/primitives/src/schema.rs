/// Kind of PL object open in an editor page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlType {
	Function,
	Procedure,
	/// Whole package (head and body together).
	Package,
	/// Package specification only.
	PackageHead,
	/// Package body only.
	PackageBody,
	Trigger,
	Type,
	/// Ad-hoc PL script without a persisted name.
	AnonymousBlock,
}

impl PlType {
	/// Returns true for package objects and their sub-elements.
	pub fn is_package(self) -> bool {
		matches!(self, Self::Package | Self::PackageHead | Self::PackageBody)
	}

	/// Returns true for package head/body sub-elements.
	pub fn is_package_part(self) -> bool {
		matches!(self, Self::PackageHead | Self::PackageBody)
	}
}

/// Descriptive metadata about the PL object being edited.
///
/// Supplied by the page's PL-object loader and never mutated by orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlSchema {
	pub pl_type: PlType,
	/// Persisted object name; `None` for anonymous blocks.
	pub pl_name: Option<String>,
	/// Owning package for package members.
	pub package_name: Option<String>,
	/// DDL text as loaded.
	pub ddl: String,
}

impl PlSchema {
	/// Creates metadata for a named object.
	pub fn named(pl_type: PlType, name: impl Into<String>, ddl: impl Into<String>) -> Self {
		Self {
			pl_type,
			pl_name: Some(name.into()),
			package_name: None,
			ddl: ddl.into(),
		}
	}

	/// Creates metadata for an anonymous block.
	pub fn anonymous(ddl: impl Into<String>) -> Self {
		Self {
			pl_type: PlType::AnonymousBlock,
			pl_name: None,
			package_name: None,
			ddl: ddl.into(),
		}
	}

	/// Builder-style owning package.
	pub fn in_package(mut self, package: impl Into<String>) -> Self {
		self.package_name = Some(package.into());
		self
	}

	/// Returns true if the object has a persisted, non-empty name.
	pub fn is_persisted(&self) -> bool {
		self.pl_name.as_deref().is_some_and(|n| !n.is_empty())
	}

	/// Returns true for anonymous blocks.
	pub fn is_anonymous(&self) -> bool {
		self.pl_type == PlType::AnonymousBlock || !self.is_persisted()
	}
}

/// Classification of a buffer returned by the pre-flight parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptKind {
	AnonymousBlock,
	Procedure,
	Function,
	/// Plain SQL statements.
	Sql,
	Unknown,
}
