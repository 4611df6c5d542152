mod common;

use bigdecimal::BigDecimal;
use common::{day, Fixture};
use shared::{BookingError, HotelId, HotelView, OrderAction, OrderId, OrderStatus, RoomTypeId, RoomTypeView, UserId};

#[tokio::test]
async fn last_unit_goes_to_the_first_confirmation() {
    let f = Fixture::with_capacity(2).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let order = f.orders.create_order(f.request(day(1), day(3))).await.unwrap();
        f.orders.pay_order(order.id).await.unwrap();
        ids.push(order.id);
    }
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    f.orders.confirm_order(a, "101").await.unwrap();
    assert_eq!(f.available(day(1), day(3)).await, vec![1, 1]);

    f.orders.confirm_order(b, "102").await.unwrap();
    assert_eq!(f.available(day(1), day(3)).await, vec![0, 0]);

    let err = f.orders.confirm_order(c, "103").await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::InsufficientInventory { room_type_id, date } if room_type_id == f.room_type_id && date == day(1)
    ));
    assert_eq!(f.available(day(1), day(3)).await, vec![0, 0]);

    let detail = f.orders.get_order_detail(c).await.unwrap();
    assert_eq!(detail.status, OrderStatus::PendingConfirmation);
    assert!(detail.assigned_room_number.is_none());

    let detail = f.orders.get_order_detail(a).await.unwrap();
    assert_eq!(detail.status, OrderStatus::PendingCheckIn);
    assert_eq!(detail.assigned_room_number.unwrap().as_str(), "101");
    assert!(detail.confirmation_timestamp.is_some());
}

#[tokio::test]
async fn new_order_is_priced_and_pending_payment() {
    let f = Fixture::with_capacity(1).await;
    let order = f.orders.create_order(f.request(day(5), day(8))).await.unwrap();

    assert_eq!(order.status, OrderStatus::PendingPayment);
    assert_eq!(order.nights(), 3);
    assert_eq!(order.total_price, BigDecimal::from(360));
    assert_eq!(f.available(day(5), day(8)).await, vec![1, 1, 1]);
}

#[tokio::test]
async fn create_rejects_bad_input_before_writing() {
    let f = Fixture::with_capacity(1).await;

    let err = f.orders.create_order(f.request(day(3), day(3))).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    let mut blank_guest = f.request(day(3), day(4));
    blank_guest.guest_phone = "  ".into();
    let err = f.orders.create_order(blank_guest).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    let mut stranger = f.request(day(3), day(4));
    stranger.user_id = UserId::new();
    let err = f.orders.create_order(stranger).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "user", .. }));

    let mut unknown_room = f.request(day(3), day(4));
    unknown_room.room_type_id = RoomTypeId::new();
    let err = f.orders.create_order(unknown_room).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "room type", .. }));
}

#[tokio::test]
async fn room_type_must_belong_to_a_sellable_hotel() {
    let f = Fixture::with_capacity(1).await;

    let other_hotel = HotelId::new();
    f.catalog
        .put_hotel(HotelView {
            id: other_hotel,
            name: "Elsewhere".into(),
            rating: 3.0,
            sellable: true,
        })
        .await;
    let mut mismatched = f.request(day(3), day(4));
    mismatched.hotel_id = other_hotel;
    let err = f.orders.create_order(mismatched).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));

    f.catalog.set_sellable(f.hotel_id, false).await;
    let err = f.orders.create_order(f.request(day(3), day(4))).await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn pay_only_from_pending_payment() {
    let f = Fixture::with_capacity(1).await;
    let order = f.orders.create_order(f.request(day(1), day(2))).await.unwrap();

    let paid = f.orders.pay_order(order.id).await.unwrap();
    assert_eq!(paid.status, OrderStatus::PendingConfirmation);

    let err = f.orders.pay_order(order.id).await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::StateConflict {
            from: OrderStatus::PendingConfirmation,
            action: OrderAction::Pay
        }
    ));
}

#[tokio::test]
async fn confirming_an_unpaid_order_leaves_the_ledger_alone() {
    let f = Fixture::with_capacity(2).await;
    let order = f.orders.create_order(f.request(day(1), day(3))).await.unwrap();

    let err = f.orders.confirm_order(order.id, "201").await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::StateConflict {
            from: OrderStatus::PendingPayment,
            action: OrderAction::Confirm
        }
    ));
    assert_eq!(f.available(day(1), day(3)).await, vec![2, 2]);
    assert_eq!(
        f.orders.get_order_detail(order.id).await.unwrap().status,
        OrderStatus::PendingPayment
    );
}

#[tokio::test]
async fn second_confirmation_takes_nothing() {
    let f = Fixture::with_capacity(2).await;
    let order = f.orders.create_order(f.request(day(1), day(3))).await.unwrap();
    f.orders.pay_order(order.id).await.unwrap();

    f.orders.confirm_order(order.id, "301").await.unwrap();
    assert_eq!(f.available(day(1), day(3)).await, vec![1, 1]);

    let err = f.orders.confirm_order(order.id, "302").await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::StateConflict {
            from: OrderStatus::PendingCheckIn,
            action: OrderAction::Confirm
        }
    ));
    assert_eq!(f.available(day(1), day(3)).await, vec![1, 1]);

    let detail = f.orders.get_order_detail(order.id).await.unwrap();
    assert_eq!(detail.assigned_room_number.unwrap().as_str(), "301");
}

#[tokio::test]
async fn blank_room_number_is_rejected() {
    let f = Fixture::with_capacity(1).await;
    let order = f.orders.create_order(f.request(day(1), day(2))).await.unwrap();
    f.orders.pay_order(order.id).await.unwrap();

    let err = f.orders.confirm_order(order.id, "   ").await.unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
    assert_eq!(f.available(day(1), day(2)).await, vec![1]);
}

#[tokio::test]
async fn stay_past_the_horizon_cannot_be_confirmed() {
    let f = Fixture::with_capacity(1).await;
    let order = f
        .orders
        .create_order(f.request(day(30), chrono::NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()))
        .await
        .unwrap();
    f.orders.pay_order(order.id).await.unwrap();

    let err = f.orders.confirm_order(order.id, "9").await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::InsufficientInventory { date, .. } if date == day(31)
    ));
    assert_eq!(f.available(day(29), day(31)).await, vec![1, 1]);
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let f = Fixture::with_capacity(1).await;
    let err = f.orders.get_order_detail(OrderId::new()).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound { entity: "order", .. }));
    let err = f.orders.pay_order(OrderId::new()).await.unwrap_err();
    assert!(matches!(err, BookingError::NotFound { .. }));
}

#[tokio::test]
async fn sweep_completes_checked_out_orders_only() {
    let f = Fixture::build(3, day(4)).await;

    let mut confirmed = Vec::new();
    for (check_in, check_out) in [(day(1), day(3)), (day(2), day(4)), (day(3), day(6))] {
        let order = f.orders.create_order(f.request(check_in, check_out)).await.unwrap();
        f.orders.pay_order(order.id).await.unwrap();
        f.orders.confirm_order(order.id, "301").await.unwrap();
        confirmed.push(order.id);
    }
    let unpaid = f.orders.create_order(f.request(day(1), day(2))).await.unwrap();
    let before = f.available(day(1), day(6)).await;

    assert_eq!(f.orders.complete_checked_out(day(4)).await.unwrap(), 2);
    assert_eq!(f.orders.complete_checked_out(day(4)).await.unwrap(), 0);

    let status = |id: OrderId| {
        let orders = f.orders.clone();
        async move { orders.get_order_detail(id).await.unwrap().status }
    };
    assert_eq!(status(confirmed[0]).await, OrderStatus::Completed);
    assert_eq!(status(confirmed[1]).await, OrderStatus::Completed);
    assert_eq!(status(confirmed[2]).await, OrderStatus::PendingCheckIn);
    assert_eq!(status(unpaid.id).await, OrderStatus::PendingPayment);

    let completed = f.orders.get_order_detail(confirmed[0]).await.unwrap();
    assert_eq!(completed.assigned_room_number.unwrap().as_str(), "301");
    assert_eq!(f.available(day(1), day(6)).await, before);
}

#[tokio::test]
async fn price_follows_the_room_type() {
    let f = Fixture::with_capacity(1).await;
    let suite = RoomTypeId::new();
    f.catalog
        .put_room_type(RoomTypeView {
            id: suite,
            hotel_id: f.hotel_id,
            name: "Suite".into(),
            total_capacity: 1,
            price: "249.50".parse().unwrap(),
        })
        .await;

    let mut request = f.request(day(1), day(3));
    request.room_type_id = suite;
    let order = f.orders.create_order(request).await.unwrap();
    assert_eq!(order.total_price, "499.00".parse::<BigDecimal>().unwrap());
}
