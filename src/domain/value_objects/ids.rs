use uuid::Uuid;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub Uuid);

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

id_type!(WorkRequestId);
id_type!(SubmissionId);
id_type!(ContractId);
id_type!(MilestoneId);
id_type!(PaymentId);
id_type!(PaymentAttemptId);
id_type!(ActorId);
id_type!(ApiKeyId);
id_type!(ProjectId);
id_type!(EventId);
id_type!(SubscriptionId);
id_type!(DeliveryId);
