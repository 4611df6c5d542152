// Catalog-owned tables. The booking engine reads them and never writes.

diesel::table! {
    hotels (id) {
        id -> Uuid,
        name -> Varchar,
        rating -> Float4,
        approved -> Bool,
    }
}

diesel::table! {
    room_types (id) {
        id -> Uuid,
        hotel_id -> Uuid,
        name -> Varchar,
        total_capacity -> Int4,
        price -> Numeric,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
    }
}

diesel::joinable!(room_types -> hotels (hotel_id));

diesel::allow_tables_to_appear_in_same_query!(hotels, room_types, users,);
