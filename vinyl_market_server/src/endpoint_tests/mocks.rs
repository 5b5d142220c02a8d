use mockall::mock;
use stripe_tools::{CheckoutSession, Event, LineItem, List, NewCheckoutSession};
use vinyl_market_engine::{
    db_types::{
        LogLevel,
        NewOrder,
        NewReview,
        NewUser,
        NewVinyl,
        OrderWithItems,
        Page,
        Pagination,
        Rating,
        Review,
        SystemLog,
        User,
        Vinyl,
    },
    traits::{
        CatalogError,
        CatalogManagement,
        GatewayError,
        InsertOrderResult,
        OrderManagement,
        OrderStoreError,
        PaymentGateway,
        Requester,
        ReviewError,
        ReviewManagement,
        SystemLogError,
        SystemLogManagement,
    },
};

mock! {
    pub MarketBackend {}
    impl ReviewManagement for MarketBackend {
        async fn create_review(&self, user_id: i64, vinyl_id: i64, review: NewReview) -> Result<(Review, Rating), ReviewError>;
        async fn delete_review(&self, review_id: i64, requester: &Requester) -> Result<(Review, Option<Rating>), ReviewError>;
        async fn fetch_review(&self, review_id: i64) -> Result<Option<Review>, ReviewError>;
        async fn fetch_reviews_for_vinyl(&self, vinyl_id: i64, pagination: &Pagination) -> Result<Page<Review>, ReviewError>;
    }
    impl SystemLogManagement for MarketBackend {
        async fn create_log(&self, level: LogLevel, message: &str) -> Result<SystemLog, SystemLogError>;
        async fn fetch_logs(&self, pagination: &Pagination) -> Result<Page<SystemLog>, SystemLogError>;
    }
    impl OrderManagement for MarketBackend {
        async fn create_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderStoreError>;
        async fn fetch_order_by_session_id(&self, session_id: &str) -> Result<Option<OrderWithItems>, OrderStoreError>;
        async fn fetch_all_orders(&self) -> Result<Vec<OrderWithItems>, OrderStoreError>;
    }
    impl CatalogManagement for MarketBackend {
        async fn fetch_vinyl(&self, vinyl_id: i64) -> Result<Option<Vinyl>, CatalogError>;
        async fn insert_vinyl(&self, vinyl: NewVinyl) -> Result<Vinyl, CatalogError>;
        async fn insert_user(&self, user: NewUser) -> Result<User, CatalogError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_checkout_session(&self, session: &NewCheckoutSession) -> Result<CheckoutSession, GatewayError>;
        async fn retrieve_session_with_line_items(&self, session_id: &str) -> Result<CheckoutSession, GatewayError>;
        async fn list_line_items(&self, session_id: &str, starting_after: &str) -> Result<List<LineItem>, GatewayError>;
        fn construct_event(&self, payload: &[u8], signature_header: &str) -> Result<Event, GatewayError>;
    }
}

impl MockMarketBackend {
    /// Accepts any number of system log writes.
    pub fn allow_logging(&mut self) -> &mut Self {
        self.expect_create_log().returning(|level, message| {
            Ok(SystemLog { id: 1, level, message: message.to_string(), created_at: chrono::Utc::now() })
        });
        self
    }
}
