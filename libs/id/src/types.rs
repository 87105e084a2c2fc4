//! ID types used across the scheduler.

use crate::define_id;

define_id!(
    /// Identity of a task. Assigned once by the API boundary and never reused.
    TaskId,
    "task"
);

define_id!(
    /// Correlates log lines and error bodies for one HTTP request.
    RequestId,
    "req"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdError;
    use proptest::prelude::*;

    #[test]
    fn test_prefixes() {
        assert!(TaskId::new().to_string().starts_with("task_"));
        assert!(RequestId::new().to_string().starts_with("req_"));
    }

    #[test]
    fn test_request_id_is_not_a_task_id() {
        let request = RequestId::new().to_string();
        let err = request.parse::<TaskId>().unwrap_err();
        assert_eq!(
            err,
            IdError::WrongKind {
                expected: "task",
                found: request,
            }
        );
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!("".parse::<TaskId>(), Err(IdError::Empty));
        assert!(matches!(
            "task01HV4Z2WQXKJNM8GPQY6VBKC3D".parse::<TaskId>(),
            Err(IdError::WrongKind { .. })
        ));
        assert_eq!(
            "task_invalid".parse::<TaskId>(),
            Err(IdError::BadUlid("invalid".to_string()))
        );
    }

    #[test]
    fn test_error_message_names_expected_kind() {
        let err = "req_01HV4Z2WQXKJNM8GPQY6VBKC3D".parse::<TaskId>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a 'task_' ID, got 'req_01HV4Z2WQXKJNM8GPQY6VBKC3D'"
        );
    }

    #[test]
    fn test_task_id_json_is_plain_string() {
        let id = TaskId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
        assert!(serde_json::from_str::<TaskId>("\"req_01HV4Z2WQXKJNM8GPQY6VBKC3D\"").is_err());
    }

    #[test]
    fn test_later_ids_sort_after() {
        let first = TaskId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = TaskId::new();
        assert!(first < second);
    }

    proptest! {
        #[test]
        fn prop_any_ulid_roundtrips(raw in any::<u128>()) {
            let text = format!("task_{}", crate::Ulid::from(raw));
            let id: TaskId = text.parse().unwrap();
            prop_assert_eq!(id.to_string(), text);
        }
    }
}
