use student_records::models::{NewGroup, NewScheduleSlot, NewStudent, NewSubject};
use student_records::storage::Storage;

fn io_err(msg: impl ToString) -> std::io::Error {
    std::io::Error::other(msg.to_string())
}

/// A contract test suite that every `Storage` backend must satisfy.
///
/// Keeps backend parity honest should a second backend ever appear.
pub async fn run_storage_contract(storage: &dyn Storage) -> Result<(), Box<dyn std::error::Error>> {
    // Group roundtrip.
    let group = storage
        .insert_group(&NewGroup {
            name: "ИТ-21".to_string(),
            description: Some("программирование".to_string()),
        })
        .await
        .map_err(io_err)?;
    assert!(group.id > 0);

    let fetched = storage
        .get_group(group.id)
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("group should exist"))?;
    assert_eq!(fetched, group);

    // Uniqueness: group names are unique.
    let dup = storage
        .insert_group(&NewGroup {
            name: "ИТ-21".to_string(),
            description: None,
        })
        .await;
    assert!(dup.is_err(), "inserting a duplicate group name should fail");

    // Student roundtrip with a group reference.
    let new_student = NewStudent {
        name: "Иван".to_string(),
        surname: "Петров".to_string(),
        group_id: Some(group.id),
        email: Some("ivan@example.com".to_string()),
        phone: None,
    };
    let student = storage.insert_student(&new_student).await.map_err(io_err)?;

    let fetched = storage
        .get_student(student.id)
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("student should exist"))?;
    assert_eq!(fetched, student);

    // Update overwrites the whole record.
    let updated = storage
        .update_student(
            student.id,
            &NewStudent {
                name: "Иван".to_string(),
                surname: "Петров".to_string(),
                group_id: None,
                email: None,
                phone: Some("+7 900 000-00-00".to_string()),
            },
        )
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("update should find the student"))?;
    assert_eq!(updated.group_id, None);
    assert_eq!(updated.email, None);
    assert_eq!(updated.phone.as_deref(), Some("+7 900 000-00-00"));

    let refetched = storage
        .get_student(student.id)
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("student should still exist"))?;
    assert_eq!(refetched, updated);

    // Absent ids: update returns None, delete returns false.
    let missing = storage.update_student(9999, &new_student).await.map_err(io_err)?;
    assert!(missing.is_none());
    assert!(!storage.delete_student(9999).await.map_err(io_err)?);

    // Subject + schedule slots, and the group filter.
    let subject = storage
        .insert_subject(&NewSubject {
            name: "Математика".to_string(),
            description: None,
        })
        .await
        .map_err(io_err)?;

    let fetched_subject = storage
        .get_subject(subject.id)
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("subject should exist"))?;
    assert_eq!(fetched_subject, subject);

    let other_group = storage
        .insert_group(&NewGroup {
            name: "ИТ-22".to_string(),
            description: None,
        })
        .await
        .map_err(io_err)?;

    let slot_a = storage
        .insert_slot(&NewScheduleSlot {
            group_id: group.id,
            subject_id: subject.id,
            day_of_week: "Понедельник".to_string(),
            lesson_number: 1,
            room: Some("204".to_string()),
        })
        .await
        .map_err(io_err)?;
    let slot_b = storage
        .insert_slot(&NewScheduleSlot {
            group_id: other_group.id,
            subject_id: subject.id,
            day_of_week: "Вторник".to_string(),
            lesson_number: 2,
            room: None,
        })
        .await
        .map_err(io_err)?;

    let all = storage.list_slots(None).await.map_err(io_err)?;
    assert!(all.len() >= 2);

    let filtered = storage.list_slots(Some(group.id)).await.map_err(io_err)?;
    assert_eq!(filtered, vec![slot_a.clone()]);

    let fetched_slot = storage
        .get_slot(slot_b.id)
        .await
        .map_err(io_err)?
        .ok_or_else(|| io_err("slot should exist"))?;
    assert_eq!(fetched_slot, slot_b);

    // Deletes report whether a row went away, and only once.
    assert!(storage.delete_slot(slot_a.id).await.map_err(io_err)?);
    assert!(!storage.delete_slot(slot_a.id).await.map_err(io_err)?);

    assert!(storage.delete_student(student.id).await.map_err(io_err)?);
    assert!(storage.delete_subject(subject.id).await.map_err(io_err)?);
    assert!(storage.delete_group(other_group.id).await.map_err(io_err)?);

    storage.healthcheck().await.map_err(io_err)?;

    Ok(())
}
