//! Action descriptor definition macro.

/// Defines a static [`ActionDescriptor`](crate::actions::ActionDescriptor).
///
/// ```ignore
/// action!(STOP => Stop, {
///     name: "Stop",
///     description: "Cancel the running query",
///     caps: DataSourceCaps::KILL_QUERY,
///     status: stop_status,
/// });
/// ```
///
/// `caps` defaults to none, `visible` to always shown and `confirm` to no
/// confirmation.
macro_rules! action {
	($static:ident => $kind:ident, {
		name: $name:literal,
		description: $desc:literal,
		$(caps: $caps:expr,)?
		status: $status:expr
		$(, visible: $visible:expr)?
		$(, confirm: $confirm:expr)?
		$(,)?
	}) => {
		pub(crate) static $static: $crate::actions::ActionDescriptor = $crate::actions::ActionDescriptor {
			kind: $crate::actions::ActionKind::$kind,
			name: $name,
			short_desc: $desc,
			required_caps: action!(@or $({$caps})?, dbide_primitives::DataSourceCaps::empty()),
			status: $status,
			visible: action!(@or $({$visible})?, $crate::actions::def::always),
			confirm: action!(@or $({$confirm})?, $crate::actions::def::never),
		};
	};

	(@or {$value:expr}, $default:expr) => {
		$value
	};
	(@or , $default:expr) => {
		$default
	};
}
