//! Wire data model
//!
//! A [`Step`] is one complete scene description polled from the command
//! source. Its [`Mark`]s are a closed set of drawable kinds; kinds this build
//! does not know deserialize to [`Mark::Unknown`] instead of failing the whole
//! step.

mod mark;
mod step;

pub use mark::{
    ArrowMark, BoxMark, CircleMark, Isa, Location, Mark, PlainMark, ScrewPositionMark,
    SectionAnnotationMark, SectionAnnotationName, TextMark, ToolType, ToolpathMark, TssName,
};
pub use step::{Step, StepType};
