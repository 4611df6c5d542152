diesel::table! {
    inventory_days (room_type_id, stay_date) {
        room_type_id -> Uuid,
        stay_date -> Date,
        total -> Int4,
        available -> Int4,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}
