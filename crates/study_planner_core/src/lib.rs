pub mod attachments;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod params;
pub mod planner;
pub mod ports;
pub mod prompt;
pub mod resources;
pub mod schema;
pub mod session;
pub mod tools;

pub use attachments::{AttachmentError, AttachmentSet, BatchReport, RawFile};
pub use domain::{
    Attachment, DayTask, Priority, ResourceLink, ResourceSuggestions, StudyPlanParams,
    StudyPlanResponse, WeeklyMilestone,
};
pub use error::PlanError;
pub use params::{SubjectList, ValidationError};
pub use planner::StudyPlanner;
pub use ports::{GenerationOutput, GenerationRequest, GenerationService, PortError, PortResult};
pub use session::{PlannerSession, SessionError};
pub use tools::{StudyTool, ToolOutput, UnknownTool};
