// Domain models: one sample per collection tick, plus the columnar wire shape.

mod sample;
mod series;

pub use sample::Sample;
pub use series::SeriesPayload;
