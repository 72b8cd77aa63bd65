use thiserror::Error;

pub type Result<T> = std::result::Result<T, NavigatorError>;

#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("'{segment}' not found under '{parent_path}' in structure '{snapshot}'")]
    ElementNotFound {
        segment: String,
        parent_path: String,
        snapshot: String,
    },

    #[error(
        "slice '{slice}' under '{parent_path}' in structure '{snapshot}' resolves to type '{found_type}', expected one of [{allowed}]"
    )]
    SliceMismatch {
        slice: String,
        parent_path: String,
        snapshot: String,
        found_type: String,
        allowed: String,
    },

    #[error(
        "cannot resolve children for choice-type element '{path}' in structure '{snapshot}': {type_count} possible types"
    )]
    AmbiguousChoice {
        path: String,
        snapshot: String,
        type_count: usize,
    },

    #[error("upstream lookup failed for {context}: {message}")]
    Upstream { context: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl NavigatorError {
    pub fn element_not_found(segment: &str, parent_path: &str, snapshot: &str) -> Self {
        NavigatorError::ElementNotFound {
            segment: segment.to_string(),
            parent_path: parent_path.to_string(),
            snapshot: snapshot.to_string(),
        }
    }

    pub fn slice_mismatch(
        slice: &str,
        parent_path: &str,
        snapshot: &str,
        found_type: &str,
        allowed: &[String],
    ) -> Self {
        NavigatorError::SliceMismatch {
            slice: slice.to_string(),
            parent_path: parent_path.to_string(),
            snapshot: snapshot.to_string(),
            found_type: found_type.to_string(),
            allowed: allowed.join(", "),
        }
    }

    pub fn ambiguous_choice(path: &str, snapshot: &str, type_count: usize) -> Self {
        NavigatorError::AmbiguousChoice {
            path: path.to_string(),
            snapshot: snapshot.to_string(),
            type_count,
        }
    }

    pub fn upstream(context: &str, message: impl std::fmt::Display) -> Self {
        NavigatorError::Upstream {
            context: context.to_string(),
            message: message.to_string(),
        }
    }

    pub fn configuration_error(message: &str) -> Self {
        NavigatorError::Configuration {
            message: message.to_string(),
        }
    }
}
