mod answer_record;
mod model_spec;

pub use answer_record::AnswerRecord;
pub use model_spec::ModelSpec;
