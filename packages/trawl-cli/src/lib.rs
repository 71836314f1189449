use clap::{
	ValueEnum,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};

use trawl_domain::request::{Intensity, TypeFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Command-line spelling of [`TypeFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
	#[default]
	Any,
	Short,
	Long,
}
impl From<TypeArg> for TypeFilter {
	fn from(arg: TypeArg) -> Self {
		match arg {
			TypeArg::Any => Self::Any,
			TypeArg::Short => Self::Short,
			TypeArg::Long => Self::Long,
		}
	}
}

/// Command-line spelling of [`Intensity`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IntensityArg {
	Basic,
	#[default]
	Medium,
	Maximum,
}
impl From<IntensityArg> for Intensity {
	fn from(arg: IntensityArg) -> Self {
		match arg {
			IntensityArg::Basic => Self::Basic,
			IntensityArg::Medium => Self::Medium,
			IntensityArg::Maximum => Self::Maximum,
		}
	}
}
