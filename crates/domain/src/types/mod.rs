//! Domain data types for the widget integration layer

pub mod calendar;
pub mod messages;
pub mod patch;
pub mod update;
pub mod widget;

pub use calendar::{
    CalendarEvent, CalendarView, CalendarWidgetData, ImportSummary, ServerTask, TaskDraft,
    TaskList, TaskPriority, TaskStatus,
};
pub use messages::{BusMessage, StatEvent};
pub use patch::Patch;
pub use update::{apply_update, DataUpdate, NodeUpdate, PositionUpdate};
pub use widget::{Board, FlowNode, Position, WidgetConfig};
