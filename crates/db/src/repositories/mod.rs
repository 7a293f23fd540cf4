mod manual_repo;

pub use manual_repo::ManualRepo;
