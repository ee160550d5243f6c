mod buffer;
mod proj;

pub(crate) use buffer::{buffer_line, buffered_point_hull, union_all};
pub(crate) use proj::MetricFrame;
