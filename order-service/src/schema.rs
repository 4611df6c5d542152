diesel::table! {
    orders (id) {
        id -> Uuid,
        hotel_id -> Uuid,
        room_type_id -> Uuid,
        user_id -> Uuid,
        check_in -> Date,
        check_out -> Date,
        nights -> Int4,
        guest_name -> Varchar,
        guest_phone -> Varchar,
        total_price -> Numeric,
        status -> Varchar,
        assigned_room_number -> Nullable<Varchar>,
        confirmed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
